use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load variables from a `.env` file in the working directory.
///
/// Variables already present in the environment win. Values may be wrapped
/// in single or double quotes. Returns how many variables were set.
pub fn load_dotenv() -> usize {
    let env_path = Path::new(".env");
    let Ok(content) = fs::read_to_string(env_path) else {
        return 0;
    };

    let mut loaded = 0;
    for (key, value) in content.lines().filter_map(parse_env_line) {
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
            loaded += 1;
        }
    }
    loaded
}

fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let mut value = value.trim();
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    (!key.is_empty()).then_some((key, value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Name the application knows the sensor by
    pub friendly_name: String,
    /// Prefix of the application-side topics
    pub base_topic: String,
    /// Prefix of the topics exchanging wire events and operations
    pub wire_topic: String,
    /// Coordinator endpoint the sensor binds to
    pub coordinator_endpoint: u8,
}

impl DeviceConfig {
    /// Topic the merged state is published on.
    pub fn state_topic(&self) -> String {
        format!("{}/{}", self.base_topic, self.friendly_name)
    }

    pub fn set_topic(&self) -> String {
        format!("{}/{}/set", self.base_topic, self.friendly_name)
    }

    pub fn get_topic(&self) -> String {
        format!("{}/{}/get", self.base_topic, self.friendly_name)
    }

    /// Topic inbound wire events arrive on.
    pub fn event_topic(&self) -> String {
        format!("{}/event", self.wire_topic)
    }

    /// Topic outbound wire operations are published on.
    pub fn request_topic(&self) -> String {
        format!("{}/request", self.wire_topic)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig {
                broker_host: "localhost".to_string(),
                broker_port: 1883,
                client_id: "presence-sensor-bridge".to_string(),
                username: None,
                password: None,
            },
            device: DeviceConfig {
                friendly_name: "presence_sensor".to_string(),
                base_topic: "zigbee2mqtt".to_string(),
                wire_topic: "zigbee/presence_sensor".to_string(),
                coordinator_endpoint: 1,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // MQTT configuration
        if let Ok(host) = std::env::var("MQTT_BROKER_HOST") {
            config.mqtt.broker_host = host;
        }
        if let Ok(port) = std::env::var("MQTT_BROKER_PORT")
            && let Ok(p) = port.parse()
        {
            config.mqtt.broker_port = p;
        }
        if let Ok(client_id) = std::env::var("MQTT_CLIENT_ID") {
            config.mqtt.client_id = client_id;
        }
        if let Ok(username) = std::env::var("MQTT_USERNAME") {
            config.mqtt.username = Some(username);
        }
        if let Ok(password) = std::env::var("MQTT_PASSWORD") {
            config.mqtt.password = Some(password);
        }

        // Device configuration
        if let Ok(name) = std::env::var("DEVICE_FRIENDLY_NAME") {
            config.device.friendly_name = name;
        }
        if let Ok(topic) = std::env::var("MQTT_BASE_TOPIC") {
            config.device.base_topic = topic;
        }
        if let Ok(topic) = std::env::var("WIRE_TOPIC") {
            config.device.wire_topic = topic;
        }
        if let Ok(endpoint) = std::env::var("COORDINATOR_ENDPOINT")
            && let Ok(e) = endpoint.parse()
        {
            config.device.coordinator_endpoint = e;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_line() {
        assert_eq!(parse_env_line("MQTT_BROKER_HOST=10.0.0.2"), Some(("MQTT_BROKER_HOST", "10.0.0.2")));
        assert_eq!(parse_env_line("  NAME = \"Hall sensor\" "), Some(("NAME", "Hall sensor")));
        assert_eq!(parse_env_line("NAME='x'"), Some(("NAME", "x")));
        assert_eq!(parse_env_line("NAME=a=b"), Some(("NAME", "a=b")));
        assert_eq!(parse_env_line("# comment"), None);
        assert_eq!(parse_env_line(""), None);
        assert_eq!(parse_env_line("no equals sign"), None);
        assert_eq!(parse_env_line("=value"), None);
    }

    #[test]
    fn test_default_topics() {
        let device = Config::default().device;
        assert_eq!(device.state_topic(), "zigbee2mqtt/presence_sensor");
        assert_eq!(device.set_topic(), "zigbee2mqtt/presence_sensor/set");
        assert_eq!(device.get_topic(), "zigbee2mqtt/presence_sensor/get");
        assert_eq!(device.event_topic(), "zigbee/presence_sensor/event");
        assert_eq!(device.request_topic(), "zigbee/presence_sensor/request");
    }
}
