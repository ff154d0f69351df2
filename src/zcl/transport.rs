//! Seam to the protocol stack that performs the actual exchanges.

use super::operation::WireOperation;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Executes wire operations against the device.
///
/// Each call suspends until the exchange completes or fails. Implementations
/// must not retry; a failure is handed straight back to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, operation: WireOperation) -> Result<()>;
}

/// In-memory transport that records every operation it receives.
///
/// Backs dry runs, where operations are logged instead of sent. Can be told
/// to reject operations to simulate a failing link.
#[derive(Default)]
pub struct RecordingTransport {
    operations: Mutex<Vec<WireOperation>>,
    failure: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every following operation with the given reason.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Accept operations again.
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Operations accepted so far, in order.
    pub fn operations(&self) -> Vec<WireOperation> {
        self.operations.lock().clone()
    }

    pub fn clear(&self) {
        self.operations.lock().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, operation: WireOperation) -> Result<()> {
        if let Some(reason) = self.failure.lock().clone() {
            return Err(BridgeError::Transport(reason));
        }
        log::info!("Dry run, not sending: {:?}", operation);
        self.operations.lock().push(operation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zcl::attribute::ON_OFF;

    #[tokio::test]
    async fn test_records_in_order() {
        let transport = RecordingTransport::new();
        transport.execute(WireOperation::read(1, &ON_OFF)).await.unwrap();
        transport.execute(WireOperation::read(3, &ON_OFF)).await.unwrap();

        let ops = transport.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].endpoint(), 1);
        assert_eq!(ops[1].endpoint(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_not_recorded() {
        let transport = RecordingTransport::new();
        transport.fail_with("link down");
        let err = transport.execute(WireOperation::read(1, &ON_OFF)).await;
        assert!(matches!(err, Err(BridgeError::Transport(reason)) if reason == "link down"));
        assert!(transport.operations().is_empty());

        transport.recover();
        assert!(transport.execute(WireOperation::read(1, &ON_OFF)).await.is_ok());
    }
}
