use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the MQTT broker connection and the
/// Meshtastic protocol parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub mqtt: MqttSettings,
    pub meshtastic: MeshtasticSettings,
}

/// MQTT broker connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Meshtastic protocol settings.
///
/// `gateway_id` doubles as the packet source address and the final topic
/// segment; `to_id` is the recipient node or `"^all"` for broadcast.
#[derive(Debug, Deserialize, Clone)]
pub struct MeshtasticSettings {
    pub gateway_id: String,
    pub to_id: String,
    pub channel: String,
    pub region: String,
    pub want_ack: bool,
    pub hop_limit: u32,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub mqtt: Option<PartialMqttSettings>,
    pub meshtastic: Option<PartialMeshtasticSettings>,
}

/// Partial MQTT settings.
///
/// Used when loading broker configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialMqttSettings {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Partial Meshtastic settings.
///
/// Used for protocol configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialMeshtasticSettings {
    pub gateway_id: Option<String>,
    pub to_id: Option<String>,
    pub channel: Option<String>,
    pub region: Option<String>,
    pub want_ack: Option<bool>,
    pub hop_limit: Option<u32>,
}

/// Provides default values for `Settings`.
///
/// Broker credentials and the gateway id have no usable defaults and stay
/// empty; `validate` rejects them until the user fills them in.
impl Default for Settings {
    fn default() -> Self {
        Self {
            mqtt: MqttSettings {
                server: String::new(),
                port: 1883,
                username: String::new(),
                password: String::new(),
            },
            meshtastic: MeshtasticSettings {
                gateway_id: String::new(),
                to_id: "^all".to_string(),
                channel: "LongFast".to_string(),
                region: "US".to_string(),
                want_ack: false,
                hop_limit: 3,
            },
        }
    }
}
