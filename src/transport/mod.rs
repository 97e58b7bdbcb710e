//! Outbound transport for status messages.
//!
//! The detector loop only sees the `Publisher` trait. `MqttPublisher` talks to
//! a broker; `DisabledPublisher` is used when publishing is switched off.

mod endpoint;
mod mqtt;

use anyhow::Result;

use crate::notify::OutboundMessage;

pub use endpoint::{parse_mqtt_endpoint, MqttEndpoint, DEFAULT_MQTTS_PORT, DEFAULT_MQTT_PORT};
pub use mqtt::{MqttPublisher, MqttSettings};

pub const DEFAULT_BROKER_ADDR: &str = "mqtt.eclipseprojects.io:1883";
pub const DEFAULT_TOPIC: &str = "BIPDemo/Messages";
pub const DEFAULT_CLIENT_ID: &str = "ripeness_detector";

pub trait Publisher {
    /// Send one message. Best effort: callers log failures and move on.
    fn publish(&mut self, message: &OutboundMessage) -> Result<()>;

    fn close(&mut self) {}
}

/// Drops every message.
#[derive(Debug, Default)]
pub struct DisabledPublisher;

impl Publisher for DisabledPublisher {
    fn publish(&mut self, message: &OutboundMessage) -> Result<()> {
        log::debug!("publishing disabled, dropping {}", message);
        Ok(())
    }
}
