//! The `config` module handles layered configuration.
//!
//! Values are resolved in precedence order: command-line overrides win over
//! `MSH_`-prefixed environment variables (e.g. `MSH_MQTT__SERVER`), which win
//! over the YAML configuration file, which wins over built-in defaults. A
//! commented default file is bootstrapped on first run.

mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{MeshtasticSettings, MqttSettings, Settings};


/// Command-line values layered on top of the loaded configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub gateway_id: Option<String>,
    pub to_id: Option<String>,
    pub channel: Option<String>,
    pub region: Option<String>,
    pub want_ack: bool,
    pub hop_limit: Option<u32>,
}

/// Loads the configuration from the given YAML file and environment variables.
/// Merges the configuration with default values.
/// Returns a `Settings` struct containing the MQTT and Meshtastic configurations.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::from(path))
        .add_source(
            Environment::with_prefix("msh")
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        mqtt: MqttSettings {
            server: partial
                .mqtt
                .as_ref()
                .and_then(|m| m.server.clone())
                .unwrap_or(default.mqtt.server),
            port: partial
                .mqtt
                .as_ref()
                .and_then(|m| m.port)
                .unwrap_or(default.mqtt.port),
            username: partial
                .mqtt
                .as_ref()
                .and_then(|m| m.username.clone())
                .unwrap_or(default.mqtt.username),
            password: partial
                .mqtt
                .as_ref()
                .and_then(|m| m.password.clone())
                .unwrap_or(default.mqtt.password),
        },
        meshtastic: MeshtasticSettings {
            gateway_id: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.gateway_id.clone())
                .unwrap_or(default.meshtastic.gateway_id),
            to_id: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.to_id.clone())
                .unwrap_or(default.meshtastic.to_id),
            channel: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.channel.clone())
                .unwrap_or(default.meshtastic.channel),
            region: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.region.clone())
                .unwrap_or(default.meshtastic.region),
            want_ack: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.want_ack)
                .unwrap_or(default.meshtastic.want_ack),
            hop_limit: partial
                .meshtastic
                .as_ref()
                .and_then(|m| m.hop_limit)
                .unwrap_or(default.meshtastic.hop_limit),
        },
    })
}

impl Settings {
    /// Applies command-line overrides on top of the loaded configuration.
    /// CLI values take precedence over config file and environment values.
    pub fn merge_cli(&mut self, overrides: &Overrides) {
        if let Some(server) = &overrides.server {
            self.mqtt.server = server.clone();
        }
        if let Some(port) = overrides.port {
            self.mqtt.port = port;
        }
        if let Some(username) = &overrides.username {
            self.mqtt.username = username.clone();
        }
        if let Some(password) = &overrides.password {
            self.mqtt.password = password.clone();
        }
        if let Some(gateway_id) = &overrides.gateway_id {
            self.meshtastic.gateway_id = gateway_id.clone();
        }
        if let Some(to_id) = &overrides.to_id {
            self.meshtastic.to_id = to_id.clone();
        }
        if let Some(channel) = &overrides.channel {
            self.meshtastic.channel = channel.clone();
        }
        if let Some(region) = &overrides.region {
            self.meshtastic.region = region.clone();
        }
        if overrides.want_ack {
            self.meshtastic.want_ack = true;
        }
        if let Some(hop_limit) = overrides.hop_limit {
            self.meshtastic.hop_limit = hop_limit;
        }
    }

    /// Validates that required configuration fields are present, reporting
    /// every missing key at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if self.mqtt.server.is_empty() {
            missing.push("mqtt.server");
        }
        if self.mqtt.username.is_empty() {
            missing.push("mqtt.username");
        }
        if self.mqtt.password.is_empty() {
            missing.push("mqtt.password");
        }
        if self.meshtastic.gateway_id.is_empty() {
            missing.push("meshtastic.gateway_id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(format!(
                "missing required configuration parameters: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Commented template written on first run. The credentials are the public
/// `mqtt.meshtastic.org` defaults; the gateway id is a placeholder the user
/// must replace.
const DEFAULT_CONFIG_TEMPLATE: &str = "\
# meshtastic-send configuration
#
# The mqtt credentials below are the public mqtt.meshtastic.org defaults.
# Replace them and the gateway_id with your own values before sending.
mqtt:
  server: mqtt.meshtastic.org
  port: 1883
  username: meshdev
  password: large4cats
meshtastic:
  gateway_id: \"!12345678\"
  to_id: \"^all\"
  channel: LongFast
  region: US
  want_ack: false
  hop_limit: 3
";

/// Returns the platform-appropriate default config file path.
pub fn default_config_path() -> PathBuf {
    #[cfg(windows)]
    let base = PathBuf::from(std::env::var_os("APPDATA").unwrap_or_default());
    #[cfg(not(windows))]
    let base = PathBuf::from(std::env::var_os("HOME").unwrap_or_default()).join(".config");

    base.join("meshtastic-send").join("config.yaml")
}

/// Writes the default configuration template to `path`, creating parent
/// directories. The file holds broker credentials, so it is created with
/// owner-only permissions on Unix.
pub fn create_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
