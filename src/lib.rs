//! Presence sensor bridge library.
//!
//! Translates between the Zigbee wire representation of the Bacchus
//! presence sensor and a flat set of named capabilities.

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod zcl;
