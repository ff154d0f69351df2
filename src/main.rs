use clap::Parser;
use log::info;
use presence_sensor_bridge::config::{Config, load_dotenv};
use presence_sensor_bridge::device::presence_sensor::{MODEL, VENDOR};
use presence_sensor_bridge::input::mqtt::MqttIntegration;
use tokio::signal;

#[derive(Parser)]
#[command(name = "presence-sensor-bridge")]
#[command(about = "Bridge a Bacchus presence sensor between its Zigbee stack and MQTT")]
struct Cli {
    /// Bind endpoints, configure reporting and read the configuration on start
    #[arg(long)]
    configure: bool,

    /// Log wire operations instead of publishing them
    #[arg(long)]
    dry_run: bool,

    /// Override the device friendly name
    #[arg(long, env = "DEVICE_FRIENDLY_NAME")]
    friendly_name: Option<String>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() -> std::io::Result<()> {
    // Environment must be complete before the runtime spawns worker threads
    let loaded = load_dotenv();
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, loaded));
    Ok(())
}

async fn run(cli: Cli, loaded: usize) {
    init_logger();
    info!("Starting presence sensor bridge for {} {}", VENDOR, MODEL);
    if loaded > 0 {
        info!("Loaded {} variable(s) from .env", loaded);
    }

    let mut config = Config::from_env();
    if let Some(name) = cli.friendly_name {
        config.device.friendly_name = name;
    }
    info!("Configuration loaded:");
    info!("  Friendly name: {}", config.device.friendly_name);
    info!("  Broker: {}:{}", config.mqtt.broker_host, config.mqtt.broker_port);
    info!("  State topic: {}", config.device.state_topic());
    info!("  Wire topic: {}", config.device.wire_topic);

    let (_device, integration) = MqttIntegration::new(config.mqtt, config.device)
        .with_configure(cli.configure)
        .with_dry_run(cli.dry_run)
        .start();

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    integration.abort();
    info!("Presence sensor bridge stopped");
}
