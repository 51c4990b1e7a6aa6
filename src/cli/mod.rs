//! The `cli` module provides the command-line surface and orchestration.
//!
//! It parses arguments, resolves the layered configuration, drives the
//! encode-and-publish pipeline, and maps every failure to a stable process
//! exit code:
//!
//! - `0` success
//! - `1` configuration error (missing file, invalid YAML, missing required fields)
//! - `2` MQTT error (connection failed, publish failed)
//! - `3` message/input error (empty message, invalid address, bad hop limit)
//! - `99` unexpected error

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info};

use crate::config::{self, Overrides};
use crate::mesh::{build_envelope, build_topic};
use crate::transport::MqttTransport;
use crate::utils::logging;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG: i32 = 1;
pub const EXIT_MQTT: i32 = 2;
pub const EXIT_MESSAGE: i32 = 3;
pub const EXIT_UNEXPECTED: i32 = 99;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(
    name = "meshtastic-send",
    about = "Send protobuf-encoded messages to a Meshtastic MQTT server",
    version
)]
pub struct Cli {
    /// Message text to send
    #[arg(long, short = 'm')]
    pub message: String,

    /// MQTT server address (overrides config file)
    #[arg(long)]
    pub server: Option<String>,

    /// MQTT server port (overrides config file)
    #[arg(long)]
    pub port: Option<u16>,

    /// MQTT username (overrides config file)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// MQTT password (overrides config file)
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Gateway node ID for the MQTT topic, e.g. "!12345678" (overrides config file)
    #[arg(long)]
    pub gateway_id: Option<String>,

    /// Recipient node ID, e.g. "!a1b2c3d4" or "^all" for broadcast (overrides config file)
    #[arg(long)]
    pub to_id: Option<String>,

    /// Meshtastic channel name, e.g. "LongFast" (overrides config file)
    #[arg(long)]
    pub channel: Option<String>,

    /// Meshtastic region code, e.g. "US" or "EU_868" (overrides config file)
    #[arg(long)]
    pub region: Option<String>,

    /// Request message acknowledgment
    #[arg(long)]
    pub want_ack: bool,

    /// Maximum hops for message propagation, 0-7 (overrides config file)
    #[arg(long)]
    pub hop_limit: Option<u32>,

    /// Path to the configuration file (default: platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            gateway_id: self.gateway_id.clone(),
            to_id: self.to_id.clone(),
            channel: self.channel.clone(),
            region: self.region.clone(),
            want_ack: self.want_ack,
            hop_limit: self.hop_limit,
        }
    }
}

/// Entry point for the CLI application. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    execute(cli).await
}

/// Runs the full pipeline for already-parsed arguments.
pub async fn execute(cli: Cli) -> i32 {
    logging::init(cli.verbose);

    if cli.message.trim().is_empty() {
        error!("message text cannot be empty");
        return EXIT_MESSAGE;
    }

    // Resolve configuration: file + environment, then CLI overrides on top.
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    if !config_path.exists() {
        info!(
            "configuration file not found, creating default config at {}",
            config_path.display()
        );
        if let Err(e) = config::create_default_config(&config_path) {
            error!("failed to create default configuration: {e}");
            return EXIT_UNEXPECTED;
        }
        info!("please edit the configuration file with your MQTT credentials and gateway id");
        return EXIT_CONFIG;
    }

    let mut settings = match config::load_config(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("failed to load configuration: {e}");
            return EXIT_CONFIG;
        }
    };
    debug!("loaded configuration from {}", config_path.display());

    settings.merge_cli(&cli.overrides());

    if let Err(e) = settings.validate() {
        error!("configuration validation failed: {e}");
        return EXIT_CONFIG;
    }

    let hop_limit = settings.meshtastic.hop_limit;
    if hop_limit > 7 {
        error!("invalid hop_limit: {hop_limit} (must be between 0 and 7)");
        return EXIT_MESSAGE;
    }

    let payload = match build_envelope(
        &cli.message,
        &settings.meshtastic.to_id,
        &settings.meshtastic.gateway_id,
        &settings.meshtastic.channel,
        settings.meshtastic.want_ack,
        hop_limit,
    ) {
        Ok(payload) => payload,
        Err(e) => {
            error!("failed to build protobuf message: {e}");
            return EXIT_MESSAGE;
        }
    };

    if cli.verbose {
        let dump = hex::encode(&payload);
        debug!("protobuf message hex dump ({} bytes):", payload.len());
        for chunk in dump.as_bytes().chunks(64) {
            debug!("  {}", String::from_utf8_lossy(chunk));
        }
    }

    let topic = build_topic(
        &settings.meshtastic.region,
        &settings.meshtastic.channel,
        &settings.meshtastic.gateway_id,
    );
    debug!("MQTT topic: {topic}");

    let mut transport = MqttTransport::new(
        &settings.mqtt.server,
        settings.mqtt.port,
        &settings.mqtt.username,
        &settings.mqtt.password,
    );

    let exit_code = deliver(&mut transport, &topic, &payload, &settings.meshtastic.to_id).await;

    // Guaranteed cleanup: disconnect never fails, even after a failed connect.
    transport.disconnect().await;
    exit_code
}

async fn deliver(
    transport: &mut MqttTransport,
    topic: &str,
    payload: &[u8],
    to_id: &str,
) -> i32 {
    if let Err(e) = transport.connect(CONNECT_TIMEOUT).await {
        error!("MQTT connection failed: {e}");
        return EXIT_MQTT;
    }

    if let Err(e) = transport.publish(topic, payload).await {
        error!("failed to publish message: {e}");
        return EXIT_MQTT;
    }

    info!("message sent successfully to {to_id}");
    EXIT_SUCCESS
}
