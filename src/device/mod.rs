//! The presence sensor device: capability registry, endpoint routing,
//! inbound decoding, outbound encoding and semantic state.

pub mod capability;
pub mod endpoints;
pub mod from_zigbee;
pub mod presence_sensor;
pub mod state;
pub mod to_zigbee;

pub use capability::{Access, Binding, Capability, CapabilityDef, Domain};
pub use endpoints::{INVALID_ENDPOINT, endpoint_for};
pub use presence_sensor::PresenceSensor;
pub use state::{SemanticState, StateUpdate};
