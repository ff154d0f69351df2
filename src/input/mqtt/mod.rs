//! MQTT surface of the bridge.
//!
//! Wire events and operations are exchanged with the Zigbee stack over one
//! pair of topics; capability state and requests with the application over
//! zigbee2mqtt-style device topics.

mod client;
mod integration;
mod transport;

pub use client::{MqttClient, MqttMessage};
pub use integration::{MqttIntegration, Route, Topics, apply_get, apply_set, parse_request};
pub use transport::MqttTransport;
