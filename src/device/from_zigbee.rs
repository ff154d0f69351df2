//! Inbound decoding: wire events to partial capability state.
//!
//! Converters are registered per cluster and report kind. A converter only
//! emits keys whose source attribute is present in the event; it never
//! fails, and an event with nothing relevant yields an empty update.

use super::capability::Capability;
use super::endpoints;
use super::state::StateUpdate;
use crate::codec::{LabelCodec, LedMode, TargetType, raw_to_lux, seconds_to_hhmm};
use crate::zcl::attribute::{self, Attribute};
use crate::zcl::{Cluster, ReportKind, WireEvent};
use log::debug;
use serde_json::{Value, json};

const REPORT_AND_READ: &[ReportKind] = &[ReportKind::AttributeReport, ReportKind::ReadResponse];
const READ_ONLY: &[ReportKind] = &[ReportKind::ReadResponse];

/// A decoder for one cluster.
pub struct FromZigbee {
    pub name: &'static str,
    pub cluster: Cluster,
    pub kinds: &'static [ReportKind],
    pub convert: fn(&WireEvent) -> StateUpdate,
}

impl FromZigbee {
    fn accepts(&self, event: &WireEvent) -> bool {
        self.cluster == event.cluster && self.kinds.contains(&event.kind)
    }
}

pub static CONVERTERS: &[FromZigbee] = &[
    FromZigbee {
        name: "on_off",
        cluster: Cluster::GenOnOff,
        kinds: REPORT_AND_READ,
        convert: on_off,
    },
    FromZigbee {
        name: "occupancy",
        cluster: Cluster::MsOccupancySensing,
        kinds: REPORT_AND_READ,
        convert: occupancy,
    },
    FromZigbee {
        name: "illuminance",
        cluster: Cluster::MsIlluminanceMeasurement,
        kinds: REPORT_AND_READ,
        convert: illuminance,
    },
    FromZigbee {
        name: "day_boundaries",
        cluster: Cluster::GenTime,
        kinds: READ_ONLY,
        convert: day_boundaries,
    },
    FromZigbee {
        name: "local_time",
        cluster: Cluster::GenTime,
        kinds: REPORT_AND_READ,
        convert: local_time,
    },
    FromZigbee {
        name: "led_mode",
        cluster: Cluster::GenOnOff,
        kinds: READ_ONLY,
        convert: led_mode,
    },
    FromZigbee {
        name: "distance",
        cluster: Cluster::MsOccupancySensing,
        kinds: REPORT_AND_READ,
        convert: distance,
    },
];

/// Run every matching converter over `event` and merge their output.
pub fn decode(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    for converter in CONVERTERS.iter().filter(|c| c.accepts(event)) {
        let partial = (converter.convert)(event);
        if !partial.is_empty() {
            debug!(
                "{} on endpoint {} decoded {:?}",
                converter.name, event.endpoint, partial
            );
        }
        update.extend(partial);
    }
    if update.is_empty() {
        debug!(
            "No capability in {:?} from {} on endpoint {}",
            event.kind, event.cluster, event.endpoint
        );
    }
    update
}

fn insert(update: &mut StateUpdate, capability: Capability, value: Value) {
    update.insert(capability.as_ref().to_string(), value);
}

/// Unsigned value of an attribute the event carries.
///
/// A present value that is not an unsigned integer is logged and skipped.
fn unsigned(event: &WireEvent, attr: &Attribute) -> Option<u64> {
    let raw = event.get(attr)?;
    let value = event.get_u64(attr);
    if value.is_none() {
        debug!(
            "Skipping {} = {} from {} on endpoint {}: not an unsigned integer",
            attr.key(),
            raw,
            event.cluster,
            event.endpoint
        );
    }
    value
}

fn on_off(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    let Some(endpoint) = endpoints::endpoint(event.endpoint) else {
        return update;
    };
    if let Some(raw) = event.get(&attribute::ON_OFF) {
        let on = matches!(raw, Value::Bool(true)) || raw.as_u64() == Some(1);
        insert(&mut update, endpoint.output, json!(if on { "ON" } else { "OFF" }));
    }
    update
}

fn occupancy(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(bitmap) = unsigned(event, &attribute::OCCUPANCY) {
        insert(&mut update, Capability::Occupancy, json!(bitmap & 0x01 == 0x01));
    }
    update
}

fn illuminance(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(threshold) = event.get(&attribute::ILLUMINANCE_THRESHOLD) {
        insert(&mut update, Capability::IlluminanceThreshold, threshold.clone());
    }
    if let Some(raw) = unsigned(event, &attribute::MEASURED_VALUE) {
        match u16::try_from(raw) {
            Ok(raw) => {
                insert(&mut update, Capability::Illuminance, json!(raw_to_lux(raw)));
                insert(&mut update, Capability::IlluminanceRaw, json!(raw));
            }
            Err(_) => debug!(
                "Skipping measuredValue {} on endpoint {}: exceeds 16 bits",
                raw, event.endpoint
            ),
        }
    }
    update
}

fn day_boundaries(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(seconds) = unsigned(event, &attribute::DST_START) {
        insert(&mut update, Capability::MinTime, json!(seconds_to_hhmm(seconds)));
    }
    if let Some(seconds) = unsigned(event, &attribute::DST_END) {
        insert(&mut update, Capability::MaxTime, json!(seconds_to_hhmm(seconds)));
    }
    update
}

fn local_time(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(seconds) = unsigned(event, &attribute::LOCAL_TIME) {
        insert(&mut update, Capability::LocalTime, json!(seconds_to_hhmm(seconds)));
    }
    update
}

/// Labels an enum ordinal, `null` standing for an ordinal without a label.
fn label<T: LabelCodec>(raw: &Value) -> Value {
    raw.as_u64()
        .and_then(T::decode)
        .map_or(Value::Null, |label| json!(label))
}

fn led_mode(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(raw) = event.get(&attribute::LED_MODE) {
        insert(&mut update, Capability::LedMode, label::<LedMode>(raw));
    }
    update
}

fn distance(event: &WireEvent) -> StateUpdate {
    let mut update = StateUpdate::new();
    if let Some(distance) = event.get(&attribute::TARGET_DISTANCE) {
        insert(&mut update, Capability::TargetDistance, distance.clone());
    }
    if let Some(raw) = event.get(&attribute::TARGET_TYPE) {
        insert(&mut update, Capability::TargetType, label::<TargetType>(raw));
    }
    if let Some(period) = event.get(&attribute::MEASUREMENT_PERIOD) {
        insert(&mut update, Capability::MeasurementPeriod, period.clone());
    }
    update
}
