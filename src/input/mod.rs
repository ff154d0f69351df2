//! Input sources feeding the presence sensor device.

pub mod mqtt;
