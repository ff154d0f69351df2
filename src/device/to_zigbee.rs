//! Outbound encoding: capability requests to wire operations.
//!
//! Planning is pure and performs all validation, so a rejected request
//! never reaches the transport.

use super::capability::{Binding, Capability, CapabilityDef, Domain};
use super::endpoints::{self, INVALID_ENDPOINT};
use super::state::StateUpdate;
use crate::codec::{Clock, LabelCodec, LedMode, hhmm_to_seconds, seconds_to_hhmm};
use crate::error::{BridgeError, Result};
use crate::zcl::attribute::{self, Attribute};
use crate::zcl::{Cluster, CommandOptions, OnOffCommand, WireOperation};
use serde_json::{Value, json};
use std::str::FromStr;

/// Operation for a set request together with the state it asserts.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPlan {
    pub operation: WireOperation,
    /// Optimistic echo. Empty for commands, which are confirmed by reports.
    pub optimistic: StateUpdate,
}

impl SetPlan {
    fn command(operation: WireOperation) -> Self {
        Self {
            operation,
            optimistic: StateUpdate::new(),
        }
    }

    fn write(operation: WireOperation, capability: Capability, echo: Value) -> Self {
        let mut optimistic = StateUpdate::new();
        optimistic.insert(capability.as_ref().to_string(), echo);
        Self {
            operation,
            optimistic,
        }
    }
}

/// Validate `value` for `capability` and build the wire operation.
pub fn plan_set(capability: Capability, value: &Value, clock: &dyn Clock) -> Result<SetPlan> {
    let def = capability.def();
    let key = capability.as_ref();

    match def.binding {
        Binding::Reported => Err(BridgeError::NotWritable(key.to_string())),
        Binding::OnOff => {
            let command = on_off_command(key, value)?;
            Ok(SetPlan::command(WireOperation::Command {
                endpoint: route(key)?,
                cluster: Cluster::GenOnOff,
                command,
                options: CommandOptions::default(),
            }))
        }
        Binding::Numeric(attr) => {
            let number = coerce_numeric(def, value)?;
            Ok(SetPlan::write(
                WireOperation::write(def.endpoint, &attr, number),
                capability,
                json!(number),
            ))
        }
        Binding::Time(attr) => {
            let text = value
                .as_str()
                .ok_or_else(|| BridgeError::validation(key, "expected HH:MM text"))?;
            let seconds =
                hhmm_to_seconds(text).map_err(|e| BridgeError::validation(key, e.to_string()))?;
            Ok(SetPlan::write(
                WireOperation::write(def.endpoint, &attr, seconds),
                capability,
                json!(seconds_to_hhmm(u64::from(seconds))),
            ))
        }
        Binding::LocalTime => {
            let seconds = clock.seconds_since_midnight();
            Ok(SetPlan::write(
                WireOperation::write(def.endpoint, &attribute::LOCAL_TIME, seconds),
                capability,
                json!(seconds_to_hhmm(u64::from(seconds))),
            ))
        }
        Binding::LedMode(attr) => {
            let ordinal = enum_ordinal::<LedMode>(key, value)?;
            Ok(SetPlan::write(
                WireOperation::write(def.endpoint, &attr, u32::from(ordinal)),
                capability,
                value.clone(),
            ))
        }
    }
}

/// Build the read that refreshes `capability`.
pub fn plan_get(capability: Capability) -> Result<WireOperation> {
    let def = capability.def();
    let key = capability.as_ref();
    if !def.readable() {
        return Err(BridgeError::NotReadable(key.to_string()));
    }

    let (endpoint, attr): (u8, Attribute) = match def.binding {
        Binding::Reported => return Err(BridgeError::NotReadable(key.to_string())),
        Binding::OnOff => (route(key)?, attribute::ON_OFF),
        Binding::Numeric(attr) | Binding::Time(attr) => (def.endpoint, attr),
        Binding::LocalTime => (def.endpoint, attribute::LOCAL_TIME),
        Binding::LedMode(attr) => (def.endpoint, attr),
    };
    Ok(WireOperation::read(endpoint, &attr))
}

fn route(key: &str) -> Result<u8> {
    match endpoints::endpoint_for(key) {
        INVALID_ENDPOINT => Err(BridgeError::Routing(key.to_string())),
        endpoint => Ok(endpoint),
    }
}

fn on_off_command(key: &str, value: &Value) -> Result<OnOffCommand> {
    value
        .as_str()
        .and_then(|token| OnOffCommand::from_str(token).ok())
        .ok_or_else(|| {
            BridgeError::validation(key, format!("{} is not one of toggle, off, on", value))
        })
}

fn coerce_numeric(def: &CapabilityDef, value: &Value) -> Result<u32> {
    let key = def.capability.as_ref();
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| BridgeError::validation(key, format!("{} is not a number", value)))?;

    if number.fract() != 0.0 {
        return Err(BridgeError::validation(key, format!("{} is not an integer", number)));
    }

    if let Domain::Numeric { min, max } = def.domain {
        let below = min.is_some_and(|min| number < f64::from(min));
        let above = max.is_some_and(|max| number > f64::from(max));
        if below || above {
            return Err(BridgeError::validation(
                key,
                format!(
                    "{} is outside {}..={}",
                    number,
                    min.unwrap_or(0),
                    max.unwrap_or(u32::MAX)
                ),
            ));
        }
    }

    if number < 0.0 || number > f64::from(u32::MAX) {
        return Err(BridgeError::validation(key, format!("{} does not fit the attribute", number)));
    }
    Ok(number as u32)
}

fn enum_ordinal<T: LabelCodec>(key: &str, value: &Value) -> Result<u8> {
    let input = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(BridgeError::validation(
                key,
                format!("{} is not one of {:?}", other, T::labels()),
            ));
        }
    };
    T::encode(&input).map_err(|e| BridgeError::validation(key, e.to_string()))
}
