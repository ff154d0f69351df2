//! Attribute definitions and wire datatypes.

use super::cluster::Cluster;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use strum::FromRepr;

/// ZCL data types used by this device
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum DataType {
    Boolean = 0x10,
    Bitmap8 = 0x18,
    Uint8 = 0x20,
    Uint16 = 0x21,
    Uint32 = 0x23,
    Enum8 = 0x30,
}

impl DataType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.tag())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = u8::deserialize(deserializer)?;
        DataType::from_repr(tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported datatype 0x{:02X}", tag)))
    }
}

/// A single attribute within a cluster.
///
/// Standard attributes travel under their herdsman name, manufacturer
/// specific ones under their decimal id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub cluster: Cluster,
    pub id: u16,
    pub name: Option<&'static str>,
    pub datatype: DataType,
}

impl Attribute {
    const fn standard(cluster: Cluster, id: u16, name: &'static str, datatype: DataType) -> Self {
        Self {
            cluster,
            id,
            name: Some(name),
            datatype,
        }
    }

    const fn custom(cluster: Cluster, id: u16, datatype: DataType) -> Self {
        Self {
            cluster,
            id,
            name: None,
            datatype,
        }
    }

    /// Key under which this attribute appears in a payload.
    pub fn key(&self) -> Cow<'static, str> {
        match self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.id.to_string()),
        }
    }

    /// Look the attribute up in a payload, by name first and then by id.
    pub fn lookup<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a Value> {
        self.name
            .and_then(|name| data.get(name))
            .or_else(|| data.get(&self.id.to_string()))
    }
}

pub const ON_OFF: Attribute = Attribute::standard(Cluster::GenOnOff, 0x0000, "onOff", DataType::Boolean);
pub const LED_MODE: Attribute = Attribute::custom(Cluster::GenOnOff, 0xF004, DataType::Enum8);

pub const OCCUPANCY: Attribute =
    Attribute::standard(Cluster::MsOccupancySensing, 0x0000, "occupancy", DataType::Bitmap8);
pub const TARGET_DISTANCE: Attribute =
    Attribute::custom(Cluster::MsOccupancySensing, 0xF005, DataType::Uint16);
pub const TARGET_TYPE: Attribute = Attribute::custom(Cluster::MsOccupancySensing, 0xF006, DataType::Enum8);
pub const MEASUREMENT_PERIOD: Attribute =
    Attribute::custom(Cluster::MsOccupancySensing, 0xF007, DataType::Uint16);

pub const MEASURED_VALUE: Attribute = Attribute::standard(
    Cluster::MsIlluminanceMeasurement,
    0x0000,
    "measuredValue",
    DataType::Uint16,
);
pub const ILLUMINANCE_THRESHOLD: Attribute =
    Attribute::custom(Cluster::MsIlluminanceMeasurement, 0xF001, DataType::Uint16);

pub const DST_START: Attribute = Attribute::standard(Cluster::GenTime, 0x0003, "dstStart", DataType::Uint32);
pub const DST_END: Attribute = Attribute::standard(Cluster::GenTime, 0x0004, "dstEnd", DataType::Uint32);
pub const LOCAL_TIME: Attribute = Attribute::standard(Cluster::GenTime, 0x0007, "localTime", DataType::Uint32);
