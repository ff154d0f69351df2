use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Invalid value for {key}: {reason}")]
    Validation { key: String, reason: String },

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("No endpoint routes capability: {0}")]
    Routing(String),

    #[error("Capability is not writable: {0}")]
    NotWritable(String),

    #[error("Capability is not readable: {0}")]
    NotReadable(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("MQTT client error: {0}")]
    MqttClient(#[from] rumqttc::ClientError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

impl BridgeError {
    pub fn validation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
