use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::forecast::{ClearSkyParams, Location, PanelOrientation};

fn default_port() -> u16 { 8080 }
fn default_api_base_url() -> String { "https://graph.facebook.com".to_string() }
fn default_api_version() -> String { "v18.0".to_string() }
fn default_mqtt_port() -> u16 { 1883 }
fn default_topic_prefix() -> String { "solar-gain".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub clear_sky: ClearSkyParams,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
    #[serde(default)]
    pub mqtt: Option<MqttConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
    /// Hours east of UTC
    #[serde(default)]
    pub timezone_offset: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Harare".to_string(),
            latitude: -17.7831,
            longitude: 31.0909,
            elevation: 650.0,
            timezone_offset: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct PanelConfig {
    pub tilt: f64,
    pub azimuth: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { tilt: 30.0, azimuth: 180.0 }
    }
}

/// Daily push of the forecast at a fixed local time.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true, hour: 7, minute: 0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhatsAppConfig {
    pub phone_number_id: String,
    pub access_token: String,
    pub recipient_number: String,
    /// Scheme and host of the Graph API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub broker_host: String,
    #[serde(default = "default_mqtt_port")]
    pub broker_port: u16,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    pub publish_interval_s: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(ConfigError::invalid("location.latitude", format!("{} not in [-90, 90]", loc.latitude)));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(ConfigError::invalid("location.longitude", format!("{} not in [-180, 180]", loc.longitude)));
        }
        if !(loc.elevation >= 0.0) {
            return Err(ConfigError::invalid("location.elevation", format!("{} must be >= 0", loc.elevation)));
        }
        if !(-12.0..=14.0).contains(&loc.timezone_offset) {
            return Err(ConfigError::invalid("location.timezone_offset", format!("{} not in [-12, 14]", loc.timezone_offset)));
        }

        if !(0.0..=90.0).contains(&self.panel.tilt) {
            return Err(ConfigError::invalid("panel.tilt", format!("{} not in [0, 90]", self.panel.tilt)));
        }
        if !(0.0..=360.0).contains(&self.panel.azimuth) {
            return Err(ConfigError::invalid("panel.azimuth", format!("{} not in [0, 360]", self.panel.azimuth)));
        }

        if !(0.0..=1.0).contains(&self.clear_sky.diffuse_fraction) {
            return Err(ConfigError::invalid("clear_sky.diffuse_fraction", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.clear_sky.albedo) {
            return Err(ConfigError::invalid("clear_sky.albedo", "must be within [0, 1]"));
        }

        let n = &self.notifications;
        if n.hour > 23 || n.minute > 59 {
            return Err(ConfigError::invalid("notifications", format!("{:02}:{:02} is not a time of day", n.hour, n.minute)));
        }
        if n.enabled {
            let complete = self.whatsapp.as_ref().is_some_and(|w| {
                !w.phone_number_id.is_empty() && !w.access_token.is_empty() && !w.recipient_number.is_empty()
            });
            if !complete {
                return Err(ConfigError::invalid("whatsapp", "credentials are required when notifications are enabled"));
            }
        }

        Ok(())
    }

    pub fn location(&self) -> Location {
        Location {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            elevation: self.location.elevation,
            timezone_offset: self.location.timezone_offset,
        }
    }

    pub fn panel(&self) -> PanelOrientation {
        PanelOrientation {
            tilt: self.panel.tilt,
            azimuth: self.panel.azimuth,
        }
    }
}
