//! Endpoint arena and capability routing.
//!
//! The sensor exposes three endpoints. Endpoint 1 carries the radar, light
//! sensor, clock and the `sensor` enable switch. Endpoints 2 and 3 are the
//! day and night outputs; endpoint 3 also owns the LED mode.

use super::capability::Capability;
use crate::zcl::attribute::{self, Attribute};
use crate::zcl::Cluster;

/// Returned by [`endpoint_for`] when no endpoint owns the key.
pub const INVALID_ENDPOINT: u8 = 0;

/// One logical sub-device.
#[derive(Debug)]
pub struct Endpoint {
    pub id: u8,
    /// Binary capability mirrored by this endpoint's on/off attribute.
    pub output: Capability,
    /// Clusters bound to the coordinator during bootstrap.
    pub bindings: &'static [Cluster],
    /// Attributes configured for periodic reporting during bootstrap.
    pub reporting: &'static [Attribute],
}

pub static ENDPOINTS: [Endpoint; 3] = [
    Endpoint {
        id: 1,
        output: Capability::Sensor,
        bindings: &[
            Cluster::GenOnOff,
            Cluster::GenTime,
            Cluster::MsOccupancySensing,
            Cluster::MsIlluminanceMeasurement,
        ],
        reporting: &[
            attribute::ON_OFF,
            attribute::MEASURED_VALUE,
            attribute::OCCUPANCY,
        ],
    },
    Endpoint {
        id: 2,
        output: Capability::DayOutput,
        bindings: &[Cluster::GenOnOff],
        reporting: &[attribute::ON_OFF],
    },
    Endpoint {
        id: 3,
        output: Capability::NightOutput,
        bindings: &[Cluster::GenOnOff],
        reporting: &[attribute::ON_OFF],
    },
];

/// Look an endpoint up by id.
pub fn endpoint(id: u8) -> Option<&'static Endpoint> {
    let index = usize::from(id.checked_sub(1)?);
    ENDPOINTS.get(index)
}

/// Endpoint owning a binary capability, or [`INVALID_ENDPOINT`].
pub fn endpoint_for(key: &str) -> u8 {
    ENDPOINTS
        .iter()
        .find(|endpoint| endpoint.output.as_ref() == key)
        .map_or(INVALID_ENDPOINT, |endpoint| endpoint.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_outputs() {
        assert_eq!(endpoint_for("sensor"), 1);
        assert_eq!(endpoint_for("day_output"), 2);
        assert_eq!(endpoint_for("night_output"), 3);
    }

    #[test]
    fn test_unknown_key_yields_sentinel() {
        assert_eq!(endpoint_for("no_such_key"), INVALID_ENDPOINT);
        assert_eq!(endpoint_for("led_mode"), INVALID_ENDPOINT);
        assert_eq!(endpoint_for(""), INVALID_ENDPOINT);
    }

    #[test]
    fn test_arena_is_indexed_by_id() {
        for (index, ep) in ENDPOINTS.iter().enumerate() {
            assert_eq!(usize::from(ep.id), index + 1);
            assert_eq!(endpoint(ep.id).map(|e| e.id), Some(ep.id));
        }
        assert!(endpoint(0).is_none());
        assert!(endpoint(4).is_none());
    }
}
