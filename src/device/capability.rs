//! Static capability registry.
//!
//! Every application-facing property is declared once here with its access
//! flags, value domain and the wire binding that governs it. Encoders and
//! decoders look the definition up instead of re-deriving it per call.

use crate::codec::{LedMode, TargetType};
use crate::error::{BridgeError, Result};
use crate::zcl::attribute::{self, Attribute};
use bitflags::bitflags;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, VariantNames};

bitflags! {
    /// What the application may do with a capability.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u8 {
        /// Value is published as part of device state
        const STATE = 0b001;
        /// Value can be set
        const WRITE = 0b010;
        /// Value can be requested with a get
        const READ = 0b100;
    }
}

/// Application-facing property names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[repr(usize)]
pub enum Capability {
    Occupancy,
    IlluminanceRaw,
    Illuminance,
    IlluminanceThreshold,
    LocalTime,
    MinTime,
    MaxTime,
    LedMode,
    TargetDistance,
    TargetType,
    MeasurementPeriod,
    Sensor,
    DayOutput,
    NightOutput,
}

/// Set of values a capability can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Boolean,
    Binary { on: &'static str, off: &'static str },
    Numeric { min: Option<u32>, max: Option<u32> },
    Text,
    Enum(&'static [&'static str]),
}

/// How a capability maps onto the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// Only ever populated from inbound reports.
    Reported,
    /// On/off attribute driven by commands on the routed endpoint.
    OnOff,
    /// Unsigned integer written as-is.
    Numeric(Attribute),
    /// `HH:MM` text stored as seconds since midnight.
    Time(Attribute),
    /// Device clock, set from the host clock.
    LocalTime,
    /// Enumerated label stored as its ordinal.
    LedMode(Attribute),
}

#[derive(Debug)]
pub struct CapabilityDef {
    pub capability: Capability,
    pub access: Access,
    pub domain: Domain,
    pub unit: Option<&'static str>,
    pub description: &'static str,
    pub endpoint: u8,
    pub binding: Binding,
}

const BINARY: Domain = Domain::Binary { on: "ON", off: "OFF" };
const UNBOUNDED: Domain = Domain::Numeric { min: None, max: None };

static CAPABILITIES: [CapabilityDef; 14] = [
    CapabilityDef {
        capability: Capability::Occupancy,
        access: Access::STATE,
        domain: Domain::Boolean,
        unit: None,
        description: "Indicates whether the device detected occupancy",
        endpoint: 1,
        binding: Binding::Reported,
    },
    CapabilityDef {
        capability: Capability::IlluminanceRaw,
        access: Access::STATE,
        domain: UNBOUNDED,
        unit: None,
        description: "Measured illuminance for threshold",
        endpoint: 1,
        binding: Binding::Reported,
    },
    CapabilityDef {
        capability: Capability::Illuminance,
        access: Access::STATE,
        domain: UNBOUNDED,
        unit: Some("lx"),
        description: "Measured illuminance in lux",
        endpoint: 1,
        binding: Binding::Reported,
    },
    CapabilityDef {
        capability: Capability::IlluminanceThreshold,
        access: Access::all(),
        domain: Domain::Numeric {
            min: Some(0),
            max: Some(50_000),
        },
        unit: None,
        description: "Illuminance threshold",
        endpoint: 1,
        binding: Binding::Numeric(attribute::ILLUMINANCE_THRESHOLD),
    },
    CapabilityDef {
        capability: Capability::LocalTime,
        access: Access::STATE.union(Access::READ),
        domain: Domain::Text,
        unit: None,
        description: "Current time",
        endpoint: 1,
        binding: Binding::LocalTime,
    },
    CapabilityDef {
        capability: Capability::MinTime,
        access: Access::all(),
        domain: Domain::Text,
        unit: None,
        description: "Day start",
        endpoint: 1,
        binding: Binding::Time(attribute::DST_START),
    },
    CapabilityDef {
        capability: Capability::MaxTime,
        access: Access::all(),
        domain: Domain::Text,
        unit: None,
        description: "Day end",
        endpoint: 1,
        binding: Binding::Time(attribute::DST_END),
    },
    CapabilityDef {
        capability: Capability::LedMode,
        access: Access::all(),
        domain: Domain::Enum(LedMode::VARIANTS),
        unit: None,
        description: "Led working mode",
        endpoint: 3,
        binding: Binding::LedMode(attribute::LED_MODE),
    },
    CapabilityDef {
        capability: Capability::TargetDistance,
        access: Access::STATE,
        domain: UNBOUNDED,
        unit: Some("cm"),
        description: "Movement target distance",
        endpoint: 1,
        binding: Binding::Reported,
    },
    CapabilityDef {
        capability: Capability::TargetType,
        access: Access::STATE,
        domain: Domain::Enum(TargetType::VARIANTS),
        unit: None,
        description: "Target type",
        endpoint: 1,
        binding: Binding::Reported,
    },
    CapabilityDef {
        capability: Capability::MeasurementPeriod,
        access: Access::all(),
        domain: Domain::Numeric {
            min: Some(0),
            max: Some(u16::MAX as u32),
        },
        unit: Some("sec"),
        description: "Distance measurement period",
        endpoint: 1,
        binding: Binding::Numeric(attribute::MEASUREMENT_PERIOD),
    },
    CapabilityDef {
        capability: Capability::Sensor,
        access: Access::all(),
        domain: BINARY,
        unit: None,
        description: "Enable sensor",
        endpoint: 1,
        binding: Binding::OnOff,
    },
    CapabilityDef {
        capability: Capability::DayOutput,
        access: Access::STATE.union(Access::READ),
        domain: BINARY,
        unit: None,
        description: "Day binding output",
        endpoint: 2,
        binding: Binding::OnOff,
    },
    CapabilityDef {
        capability: Capability::NightOutput,
        access: Access::STATE.union(Access::READ),
        domain: BINARY,
        unit: None,
        description: "Night binding output",
        endpoint: 3,
        binding: Binding::OnOff,
    },
];

impl Capability {
    /// Registry entry for this capability.
    pub fn def(self) -> &'static CapabilityDef {
        &CAPABILITIES[self as usize]
    }

    /// Resolve an application key, rejecting names the device does not expose.
    pub fn from_key(key: &str) -> Result<Self> {
        Capability::from_str(key).map_err(|_| BridgeError::UnknownCapability(key.to_string()))
    }
}

impl CapabilityDef {
    /// Whether a set request can be encoded for this capability.
    ///
    /// Outputs accept commands and the clock accepts a sync even though
    /// neither advertises WRITE.
    pub fn settable(&self) -> bool {
        !matches!(self.binding, Binding::Reported)
    }

    /// Whether a get request can be encoded for this capability.
    pub fn readable(&self) -> bool {
        self.access.contains(Access::READ) && !matches!(self.binding, Binding::Reported)
    }
}

/// Every registered capability, in declaration order.
pub fn all() -> &'static [CapabilityDef] {
    &CAPABILITIES
}
