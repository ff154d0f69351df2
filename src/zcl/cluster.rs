use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, FromRepr};

/// Clusters bound on the presence sensor's endpoints.
///
/// Names follow the zigbee-herdsman naming (`genOnOff`, `msOccupancySensing`, ...)
/// since that is what inbound events and outbound requests carry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, FromRepr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[repr(u16)]
pub enum Cluster {
    GenOnOff = 0x0006,
    GenTime = 0x000A,
    MsIlluminanceMeasurement = 0x0400,
    MsOccupancySensing = 0x0406,
}

impl Cluster {
    /// Numeric ZCL cluster id.
    pub fn id(self) -> u16 {
        self as u16
    }
}

/// On/Off cluster commands
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, FromRepr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum OnOffCommand {
    Off = 0x00,
    On = 0x01,
    Toggle = 0x02,
}
