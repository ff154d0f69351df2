//! MQTT integration orchestrator for the presence sensor.
//!
//! Routes wire events from the Zigbee stack into the device, application
//! set/get requests into the encoder, and publishes the merged state back to
//! the application.

use super::client::{MqttClient, MqttMessage, publish};
use super::transport::MqttTransport;
use crate::config::{DeviceConfig, MqttConfig};
use crate::device::{PresenceSensor, StateUpdate};
use crate::error::{BridgeError, Result};
use crate::zcl::{RecordingTransport, Transport, WireEvent};
use futures_util::future::join_all;
use log::{error, info, warn};
use rumqttc::{AsyncClient, QoS};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};

/// Where an inbound MQTT message is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    WireEvent,
    Set,
    Get,
}

/// Topic layout for one device.
#[derive(Debug, Clone)]
pub struct Topics {
    pub state: String,
    pub set: String,
    pub get: String,
    pub event: String,
}

impl Topics {
    pub fn new(device: &DeviceConfig) -> Self {
        Self {
            state: device.state_topic(),
            set: device.set_topic(),
            get: device.get_topic(),
            event: device.event_topic(),
        }
    }

    pub fn subscriptions(&self) -> [&str; 3] {
        [self.event.as_str(), self.set.as_str(), self.get.as_str()]
    }

    pub fn route(&self, topic: &str) -> Option<Route> {
        if topic == self.event {
            Some(Route::WireEvent)
        } else if topic == self.set {
            Some(Route::Set)
        } else if topic == self.get {
            Some(Route::Get)
        } else {
            None
        }
    }
}

/// Parse a set/get payload: a JSON object keyed by capability name.
pub fn parse_request(payload: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(BridgeError::validation(
            "payload",
            format!("expected a JSON object, got {}", other),
        )),
    }
}

/// Apply every key of a set request concurrently.
///
/// Returns the merged optimistic echo of the keys that succeeded. Failures
/// are logged per key and do not affect the others.
pub async fn apply_set(device: &PresenceSensor, request: &Map<String, Value>) -> StateUpdate {
    let results = join_all(
        request
            .iter()
            .map(|(key, value)| async move { (key, device.set(key, value).await) }),
    )
    .await;

    let mut echo = StateUpdate::new();
    for (key, result) in results {
        match result {
            Ok(update) => echo.extend(update),
            Err(e) => warn!("[MQTT] Set {} failed: {}", key, e),
        }
    }
    echo
}

/// Issue a read for every key of a get request concurrently.
pub async fn apply_get(device: &PresenceSensor, request: &Map<String, Value>) {
    let results = join_all(
        request
            .keys()
            .map(|key| async move { (key, device.get(key).await) }),
    )
    .await;

    for (key, result) in results {
        if let Err(e) = result {
            warn!("[MQTT] Get {} failed: {}", key, e);
        }
    }
}

/// MQTT integration orchestrator.
pub struct MqttIntegration {
    mqtt: MqttConfig,
    device_config: DeviceConfig,
    configure_on_start: bool,
    dry_run: bool,
}

impl MqttIntegration {
    pub fn new(mqtt: MqttConfig, device_config: DeviceConfig) -> Self {
        Self {
            mqtt,
            device_config,
            configure_on_start: false,
            dry_run: false,
        }
    }

    /// Run the bootstrap sequence once the broker connection is up.
    pub fn with_configure(mut self, configure: bool) -> Self {
        self.configure_on_start = configure;
        self
    }

    /// Log wire operations instead of publishing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Start the integration in a background task.
    ///
    /// The returned device shares the MQTT client with the task and can be
    /// driven directly as well. Aborting the handle stops every task the
    /// integration spawned.
    pub fn start(self) -> (Arc<PresenceSensor>, JoinHandle<()>) {
        let mqtt_client = MqttClient::new(&self.mqtt);
        let client = mqtt_client.client();

        let (update_tx, update_rx) = mpsc::channel::<StateUpdate>(64);
        let device = Arc::new(
            PresenceSensor::new(self.transport(client.clone())).with_update_channel(update_tx),
        );

        let task_device = device.clone();
        let handle = tokio::spawn(async move {
            self.run(mqtt_client, client, task_device, update_rx).await;
        });
        (device, handle)
    }

    fn transport(&self, client: AsyncClient) -> Arc<dyn Transport> {
        if self.dry_run {
            info!("[MQTT] Dry run, wire operations are logged only");
            Arc::new(RecordingTransport::new())
        } else {
            Arc::new(MqttTransport::new(client, self.device_config.request_topic()))
        }
    }

    async fn run(
        self,
        mqtt_client: MqttClient,
        client: AsyncClient,
        device: Arc<PresenceSensor>,
        mut update_rx: mpsc::Receiver<StateUpdate>,
    ) {
        let topics = Topics::new(&self.device_config);
        info!(
            "[MQTT] Connecting to {}:{}",
            self.mqtt.broker_host, self.mqtt.broker_port
        );

        // Dropped with this future, which aborts everything spawned into it
        let mut tasks = JoinSet::new();

        let (msg_tx, mut msg_rx) = mpsc::channel::<MqttMessage>(64);
        let (connected_tx, connected_rx) = oneshot::channel();

        tasks.spawn(async move {
            mqtt_client.run(msg_tx, Some(connected_tx)).await;
        });

        // Forward merged state to the application
        let state_client = client.clone();
        let state_topic = topics.state.clone();
        tasks.spawn(async move {
            while let Some(state) = update_rx.recv().await {
                let payload = Value::Object(state).to_string();
                if let Err(e) = publish(&state_client, &state_topic, &payload).await {
                    warn!("[MQTT] Failed to publish state: {:?}", e);
                }
            }
        });

        match tokio::time::timeout(Duration::from_secs(10), connected_rx).await {
            Ok(Ok(())) => {
                info!("[MQTT] Connection established, subscribing to topics");
            }
            Ok(Err(_)) => {
                warn!("[MQTT] Connection signal channel dropped");
                return;
            }
            Err(_) => {
                warn!("[MQTT] Connection timeout after 10 seconds");
                return;
            }
        }

        for topic in topics.subscriptions() {
            if let Err(e) = client.subscribe(topic, QoS::AtMostOnce).await {
                warn!("[MQTT] Failed to subscribe to {}: {:?}", topic, e);
            }
        }

        if self.configure_on_start {
            let device = device.clone();
            let coordinator = self.device_config.coordinator_endpoint;
            tasks.spawn(async move {
                if let Err(e) = device.configure(coordinator).await {
                    error!("[MQTT] Bootstrap failed: {}", e);
                }
            });
        }

        info!(
            "[MQTT] Integration started for {}",
            self.device_config.friendly_name
        );

        loop {
            tokio::select! {
                msg = msg_rx.recv() => {
                    let Some(msg) = msg else {
                        break;
                    };
                    let Some(route) = topics.route(&msg.topic) else {
                        continue;
                    };
                    let device = device.clone();
                    // Requests run independently of each other
                    tasks.spawn(async move {
                        handle_message(&device, route, &msg.payload).await;
                    });
                }
                Some(_) = tasks.join_next() => {}
            }
        }
    }
}

async fn handle_message(device: &PresenceSensor, route: Route, payload: &str) {
    match route {
        Route::WireEvent => match serde_json::from_str::<WireEvent>(payload) {
            Ok(event) => {
                device.handle_event(&event).await;
            }
            Err(e) => warn!("[MQTT] Failed to parse wire event: {}", e),
        },
        Route::Set => match parse_request(payload) {
            Ok(request) => {
                let echo = apply_set(device, &request).await;
                if !echo.is_empty() {
                    info!("[MQTT] Set applied: {}", Value::Object(echo));
                }
            }
            Err(e) => warn!("[MQTT] Invalid set request: {}", e),
        },
        Route::Get => match parse_request(payload) {
            Ok(request) => apply_get(device, &request).await,
            Err(e) => warn!("[MQTT] Invalid get request: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::zcl::WireOperation;
    use rumqttc::MqttOptions;
    use serde_json::json;

    #[test]
    fn test_routes() {
        let topics = Topics::new(&Config::default().device);
        assert_eq!(topics.route("zigbee/presence_sensor/event"), Some(Route::WireEvent));
        assert_eq!(topics.route("zigbee2mqtt/presence_sensor/set"), Some(Route::Set));
        assert_eq!(topics.route("zigbee2mqtt/presence_sensor/get"), Some(Route::Get));
        assert_eq!(topics.route("zigbee2mqtt/presence_sensor"), None);
    }

    #[test]
    fn test_parse_request() {
        let request = parse_request(r#"{"sensor": "ON", "min_time": "08:00"}"#).unwrap();
        assert_eq!(request.len(), 2);
        assert!(parse_request("[1, 2]").is_err());
        assert!(parse_request("not json").is_err());
    }

    #[tokio::test]
    async fn test_apply_set_isolates_failures() {
        let transport = Arc::new(RecordingTransport::new());
        let device = PresenceSensor::new(transport.clone());
        let request = parse_request(
            r#"{"sensor": "purple", "illuminance_threshold": 300, "led_mode": "Never"}"#,
        )
        .unwrap();

        let echo = apply_set(&device, &request).await;
        assert_eq!(
            Value::Object(echo),
            json!({"illuminance_threshold": 300, "led_mode": "Never"})
        );
        assert_eq!(transport.operations().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_get_reads_each_key() {
        let transport = Arc::new(RecordingTransport::new());
        let device = PresenceSensor::new(transport.clone());
        let request = parse_request(r#"{"day_output": "", "target_type": ""}"#).unwrap();

        apply_get(&device, &request).await;
        let ops = transport.operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], WireOperation::Read { endpoint: 2, .. }));
    }

    #[tokio::test]
    async fn test_wire_event_message_updates_state() {
        let transport = Arc::new(RecordingTransport::new());
        let device = PresenceSensor::new(transport);
        handle_message(
            &device,
            Route::WireEvent,
            r#"{"cluster":"genOnOff","type":"attributeReport","endpoint":1,"data":{"onOff":0}}"#,
        )
        .await;
        assert_eq!(device.state().get("sensor"), Some(&json!("OFF")));
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_the_broker() {
        let config = Config::default();
        let (client, event_loop) = AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 10);
        drop(event_loop);

        let integration = MqttIntegration::new(config.mqtt, config.device).with_dry_run(true);
        let device = PresenceSensor::new(integration.transport(client));
        let echo = device.set("measurement_period", &json!(20)).await.unwrap();
        assert_eq!(Value::Object(echo), json!({"measurement_period": 20}));
        device.get("sensor").await.unwrap();
        assert!(device
            .set("sensor", &json!("ON"))
            .await
            .is_ok_and(|echo| echo.is_empty()));
    }

    #[tokio::test]
    async fn test_abort_stops_background_tasks() {
        let mut config = Config::default();
        config.mqtt.broker_host = "127.0.0.1".to_string();
        config.mqtt.broker_port = 1;

        let (device, handle) = MqttIntegration::new(config.mqtt, config.device).start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(device.is_publishing());

        handle.abort();
        let _ = handle.await;

        let stopped = tokio::time::timeout(Duration::from_secs(1), async {
            while device.is_publishing() {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(stopped.is_ok(), "state publisher outlived the integration");
    }
}
