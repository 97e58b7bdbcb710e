//! Deployment settings: camera, broker, display.
//!
//! Detection thresholds are not configurable; they live in the class table in
//! `color`. Settings resolve in this order: built-in defaults, then the TOML
//! file named by `RIPENESS_CONFIG`, then environment overrides. The binary
//! applies its command-line flags on top and only then calls `validate`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::ingest::{CameraSpec, DEFAULT_CAMERA};
use crate::pipeline::DEFAULT_HEALTH_INTERVAL;
use crate::transport::{
    parse_mqtt_endpoint, MqttSettings, DEFAULT_BROKER_ADDR, DEFAULT_CLIENT_ID, DEFAULT_TOPIC,
};

pub const CONFIG_ENV: &str = "RIPENESS_CONFIG";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    camera: Option<CameraConfigFile>,
    mqtt: Option<MqttConfigFile>,
    display: Option<DisplayConfigFile>,
    runtime: Option<RuntimeConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CameraConfigFile {
    source: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct MqttConfigFile {
    enabled: Option<bool>,
    broker_addr: Option<String>,
    topic: Option<String>,
    client_id: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DisplayConfigFile {
    headless: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RuntimeConfigFile {
    health_interval_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub camera: String,
    pub mqtt: MqttConfig,
    pub headless: bool,
    pub health_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub enabled: bool,
    pub broker_addr: String,
    pub topic: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Settings given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub camera: Option<String>,
    pub mqtt_broker_addr: Option<String>,
    pub mqtt_topic: Option<String>,
    pub mqtt_client_id: Option<String>,
    pub no_publish: bool,
    pub headless: bool,
}

impl MqttConfig {
    pub fn settings(&self) -> Result<MqttSettings> {
        Ok(MqttSettings {
            endpoint: parse_mqtt_endpoint(&self.broker_addr)?,
            topic: self.topic.clone(),
            client_id: self.client_id.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_file(DetectorConfigFile::default())
    }
}

impl DetectorConfig {
    /// Load from `RIPENESS_CONFIG` (if set) and the environment, validated.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).ok();
        let cfg = Self::load_from(path.as_deref().map(Path::new))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit file (if any) and the environment.
    ///
    /// Not validated: callers layer their own overrides on top and call
    /// `validate` once at the end.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => DetectorConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn from_file(file: DetectorConfigFile) -> Self {
        let mqtt_file = file.mqtt.unwrap_or_default();
        Self {
            camera: file
                .camera
                .and_then(|camera| camera.source)
                .unwrap_or_else(|| DEFAULT_CAMERA.to_string()),
            mqtt: MqttConfig {
                enabled: mqtt_file.enabled.unwrap_or(true),
                broker_addr: mqtt_file
                    .broker_addr
                    .unwrap_or_else(|| DEFAULT_BROKER_ADDR.to_string()),
                topic: mqtt_file.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
                client_id: mqtt_file
                    .client_id
                    .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
                username: mqtt_file.username,
                password: mqtt_file.password,
            },
            headless: file
                .display
                .and_then(|display| display.headless)
                .unwrap_or(false),
            health_interval: file
                .runtime
                .and_then(|runtime| runtime.health_interval_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_HEALTH_INTERVAL),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(camera) = non_empty_env("RIPENESS_CAMERA") {
            self.camera = camera;
        }
        if let Some(addr) = non_empty_env("RIPENESS_MQTT_BROKER") {
            self.mqtt.broker_addr = addr;
        }
        if let Some(topic) = non_empty_env("RIPENESS_MQTT_TOPIC") {
            self.mqtt.topic = topic;
        }
        if let Some(client_id) = non_empty_env("RIPENESS_MQTT_CLIENT_ID") {
            self.mqtt.client_id = client_id;
        }
        if let Some(publish) = non_empty_env("RIPENESS_PUBLISH") {
            self.mqtt.enabled = parse_bool(&publish).ok_or_else(|| {
                anyhow!("RIPENESS_PUBLISH must be true or false, got {}", publish)
            })?;
        }
        Ok(())
    }

    /// Apply command-line overrides. Call `validate` afterwards.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(camera) = &overrides.camera {
            self.camera = camera.clone();
        }
        if let Some(addr) = &overrides.mqtt_broker_addr {
            self.mqtt.broker_addr = addr.clone();
        }
        if let Some(topic) = &overrides.mqtt_topic {
            self.mqtt.topic = topic.clone();
        }
        if let Some(client_id) = &overrides.mqtt_client_id {
            self.mqtt.client_id = client_id.clone();
        }
        if overrides.no_publish {
            self.mqtt.enabled = false;
        }
        if overrides.headless {
            self.headless = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        CameraSpec::parse(&self.camera).context("invalid camera source")?;
        if self.mqtt.enabled {
            parse_mqtt_endpoint(&self.mqtt.broker_addr).context("invalid MQTT broker address")?;
            if self.mqtt.topic.trim().is_empty() {
                return Err(anyhow!("MQTT topic must not be empty"));
            }
            if self.mqtt.client_id.trim().is_empty() {
                return Err(anyhow!("MQTT client id must not be empty"));
            }
        }
        if self.health_interval.is_zero() {
            return Err(anyhow!("health interval must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<DetectorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
