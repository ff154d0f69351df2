//! Transport that hands wire operations to a Zigbee stack over MQTT.

use super::client::publish;
use crate::error::Result;
use crate::zcl::{Transport, WireOperation};
use async_trait::async_trait;
use rumqttc::AsyncClient;

/// Publishes each operation as JSON on the request topic.
///
/// The exchange completes once the broker client accepted the publish; a
/// rejected publish surfaces as an error without retry.
pub struct MqttTransport {
    client: AsyncClient,
    request_topic: String,
}

impl MqttTransport {
    pub fn new(client: AsyncClient, request_topic: impl Into<String>) -> Self {
        Self {
            client,
            request_topic: request_topic.into(),
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn execute(&self, operation: WireOperation) -> Result<()> {
        let payload = serde_json::to_string(&operation)?;
        publish(&self.client, &self.request_topic, &payload).await?;
        Ok(())
    }
}
