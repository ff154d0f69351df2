//! Bacchus presence sensor device.
//!
//! Ties the capability registry, the codecs and the endpoint arena to a
//! [`Transport`] and keeps the resulting semantic state.

use super::capability::Capability;
use super::endpoints::ENDPOINTS;
use super::from_zigbee;
use super::state::{SemanticState, StateUpdate};
use super::to_zigbee::{self, SetPlan};
use crate::codec::{Clock, LocalClock};
use crate::error::Result;
use crate::zcl::{Transport, WireEvent, WireOperation};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const MODEL: &str = "Presence_Sensor_v2.6";
pub const VENDOR: &str = "Bacchus";

/// Configuration read back once bootstrap has set up reporting.
const INITIAL_READS: [Capability; 6] = [
    Capability::IlluminanceThreshold,
    Capability::MinTime,
    Capability::MaxTime,
    Capability::MeasurementPeriod,
    Capability::Sensor,
    Capability::LedMode,
];

/// Operations that bring a freshly joined sensor into a reporting state.
///
/// Binds and reporting are set up per endpoint in arena order, followed by
/// reads of every configuration attribute.
pub fn bootstrap_operations(coordinator: u8) -> Vec<WireOperation> {
    let mut operations = Vec::new();
    for endpoint in &ENDPOINTS {
        operations.extend(endpoint.bindings.iter().map(|&cluster| WireOperation::Bind {
            endpoint: endpoint.id,
            cluster,
            target: coordinator,
        }));
        operations.extend(
            endpoint
                .reporting
                .iter()
                .map(|attr| WireOperation::configure_reporting(endpoint.id, attr)),
        );
    }

    operations.extend(
        INITIAL_READS
            .iter()
            .filter_map(|&capability| to_zigbee::plan_get(capability).ok()),
    );
    operations
}

/// One attached presence sensor.
///
/// All methods take `&self`; concurrent requests for different capabilities
/// run independently against the shared transport.
pub struct PresenceSensor {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    state: SemanticState,
    /// Channel receiving the merged state after every change
    update_tx: Option<mpsc::Sender<StateUpdate>>,
}

impl PresenceSensor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            clock: Arc::new(LocalClock),
            state: SemanticState::new(),
            update_tx: None,
        }
    }

    /// Use a different time source for clock synchronisation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set a channel to receive the merged state whenever it changes.
    pub fn with_update_channel(mut self, tx: mpsc::Sender<StateUpdate>) -> Self {
        self.update_tx = Some(tx);
        self
    }

    /// Decode an inbound event and merge it as confirmed state.
    ///
    /// Returns the partial update, which is empty when the event carried
    /// nothing this device exposes.
    pub async fn handle_event(&self, event: &WireEvent) -> StateUpdate {
        let update = from_zigbee::decode(event);
        if self.state.apply_confirmed(&update) {
            self.publish().await;
        }
        update
    }

    /// Set a capability and return the optimistic echo.
    ///
    /// Validation happens before anything is sent. On failure the state is
    /// left untouched.
    pub async fn set(&self, key: &str, value: &Value) -> Result<StateUpdate> {
        let capability = Capability::from_key(key)?;
        let SetPlan {
            operation,
            optimistic,
        } = to_zigbee::plan_set(capability, value, self.clock.as_ref()).inspect_err(|e| {
            warn!("Rejected set of {} to {}: {}", key, value, e);
        })?;

        let mark = self.state.mark();
        self.execute(operation).await?;

        if self.state.apply_optimistic_since(&optimistic, mark) {
            self.publish().await;
        }
        Ok(optimistic)
    }

    /// Ask the device to report a capability. The answer arrives later as an
    /// inbound event.
    pub async fn get(&self, key: &str) -> Result<()> {
        let capability = Capability::from_key(key)?;
        let operation = to_zigbee::plan_get(capability)?;
        self.execute(operation).await
    }

    /// Bind endpoints to `coordinator`, configure reporting and read the
    /// current configuration. Stops at the first failure.
    pub async fn configure(&self, coordinator: u8) -> Result<()> {
        info!("Configuring {} {} for coordinator endpoint {}", VENDOR, MODEL, coordinator);
        for operation in bootstrap_operations(coordinator) {
            self.execute(operation).await?;
        }
        info!("{} configured", MODEL);
        Ok(())
    }

    /// Merged semantic state.
    pub fn state(&self) -> StateUpdate {
        self.state.snapshot()
    }

    /// Access to the layered state.
    pub fn semantic_state(&self) -> &SemanticState {
        &self.state
    }

    /// Whether a receiver still listens for state updates.
    pub fn is_publishing(&self) -> bool {
        self.update_tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    async fn execute(&self, operation: WireOperation) -> Result<()> {
        debug!("Sending {:?}", operation);
        self.transport.execute(operation).await.inspect_err(|e| {
            error!("Wire operation failed: {}", e);
        })
    }

    async fn publish(&self) {
        if let Some(tx) = &self.update_tx
            && tx.send(self.state.snapshot()).await.is_err()
        {
            warn!("State update channel closed");
        }
    }
}
