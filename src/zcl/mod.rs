//! Zigbee Cluster Library vocabulary used by the presence sensor.
//!
//! Only the clusters, attributes and commands this device speaks are
//! modelled here. Everything else on the wire is ignored.

pub mod attribute;
pub mod cluster;
pub mod event;
pub mod operation;
pub mod transport;

pub use attribute::{Attribute, DataType};
pub use cluster::{Cluster, OnOffCommand};
pub use event::{ReportKind, WireEvent};
pub use operation::{CommandOptions, ReportingConfig, WireOperation};
pub use transport::{RecordingTransport, Transport};
