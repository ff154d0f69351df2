//! Outbound requests handed to the protocol stack.

use super::attribute::{Attribute, DataType};
use super::cluster::{Cluster, OnOffCommand};
use serde::{Deserialize, Serialize};

/// Attribute reporting intervals requested during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingConfig {
    pub attribute: u16,
    pub datatype: DataType,
    pub minimum_report_interval: u16,
    pub maximum_report_interval: u16,
    pub reportable_change: u32,
}

impl ReportingConfig {
    /// Report at least hourly, on every change.
    pub fn hourly(attribute: &Attribute) -> Self {
        Self {
            attribute: attribute.id,
            datatype: attribute.datatype,
            minimum_report_interval: 0,
            maximum_report_interval: 3600,
            reportable_change: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOptions {
    pub disable_default_response: bool,
}

/// One request/response exchange against the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WireOperation {
    #[serde(rename_all = "camelCase")]
    Bind {
        endpoint: u8,
        cluster: Cluster,
        target: u8,
    },
    #[serde(rename_all = "camelCase")]
    ConfigureReporting {
        endpoint: u8,
        cluster: Cluster,
        config: ReportingConfig,
    },
    #[serde(rename_all = "camelCase")]
    Read {
        endpoint: u8,
        cluster: Cluster,
        attributes: Vec<u16>,
    },
    #[serde(rename_all = "camelCase")]
    Write {
        endpoint: u8,
        cluster: Cluster,
        attribute: u16,
        value: u32,
        datatype: DataType,
    },
    #[serde(rename_all = "camelCase")]
    Command {
        endpoint: u8,
        cluster: Cluster,
        command: OnOffCommand,
        options: CommandOptions,
    },
}

impl WireOperation {
    pub fn read(endpoint: u8, attribute: &Attribute) -> Self {
        WireOperation::Read {
            endpoint,
            cluster: attribute.cluster,
            attributes: vec![attribute.id],
        }
    }

    pub fn write(endpoint: u8, attribute: &Attribute, value: u32) -> Self {
        WireOperation::Write {
            endpoint,
            cluster: attribute.cluster,
            attribute: attribute.id,
            value,
            datatype: attribute.datatype,
        }
    }

    pub fn configure_reporting(endpoint: u8, attribute: &Attribute) -> Self {
        WireOperation::ConfigureReporting {
            endpoint,
            cluster: attribute.cluster,
            config: ReportingConfig::hourly(attribute),
        }
    }

    /// Endpoint this operation is addressed to.
    pub fn endpoint(&self) -> u8 {
        match self {
            WireOperation::Bind { endpoint, .. }
            | WireOperation::ConfigureReporting { endpoint, .. }
            | WireOperation::Read { endpoint, .. }
            | WireOperation::Write { endpoint, .. }
            | WireOperation::Command { endpoint, .. } => *endpoint,
        }
    }
}
