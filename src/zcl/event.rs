//! Inbound attribute reports and read responses.

use super::attribute::Attribute;
use super::cluster::Cluster;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How an inbound event was produced by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    /// Pushed by the device through a binding.
    AttributeReport,
    /// Answer to an explicit read.
    ReadResponse,
}

/// An event delivered by the protocol stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    pub cluster: Cluster,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub endpoint: u8,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl WireEvent {
    pub fn new(cluster: Cluster, kind: ReportKind, endpoint: u8, data: Map<String, Value>) -> Self {
        Self {
            cluster,
            kind,
            endpoint,
            data,
        }
    }

    /// Raw payload value for `attribute`, if the event carries it.
    pub fn get(&self, attribute: &Attribute) -> Option<&Value> {
        attribute.lookup(&self.data)
    }

    /// Payload value for `attribute` as an unsigned integer.
    ///
    /// Booleans read as 0/1. Anything else non-numeric reads as absent.
    pub fn get_u64(&self, attribute: &Attribute) -> Option<u64> {
        match self.get(attribute)? {
            Value::Bool(b) => Some(u64::from(*b)),
            other => other.as_u64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zcl::attribute::{ON_OFF, TARGET_TYPE};
    use serde_json::json;

    #[test]
    fn test_deserialize_event() {
        let event: WireEvent = serde_json::from_value(json!({
            "cluster": "genOnOff",
            "type": "attributeReport",
            "endpoint": 3,
            "data": {"onOff": 1}
        }))
        .unwrap();

        assert_eq!(event.cluster, Cluster::GenOnOff);
        assert_eq!(event.kind, ReportKind::AttributeReport);
        assert_eq!(event.endpoint, 3);
        assert_eq!(event.get_u64(&ON_OFF), Some(1));
    }

    #[test]
    fn test_missing_data_defaults_to_empty() {
        let event: WireEvent = serde_json::from_value(json!({
            "cluster": "msOccupancySensing",
            "type": "readResponse",
            "endpoint": 1
        }))
        .unwrap();
        assert!(event.data.is_empty());
        assert_eq!(event.get(&TARGET_TYPE), None);
    }

    #[test]
    fn test_get_u64_accepts_booleans() {
        let data = json!({"onOff": true});
        let event = WireEvent::new(
            Cluster::GenOnOff,
            ReportKind::AttributeReport,
            1,
            data.as_object().cloned().unwrap(),
        );
        assert_eq!(event.get_u64(&ON_OFF), Some(1));
    }
}
