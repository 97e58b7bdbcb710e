use anyhow::{anyhow, Result};
use rumqttc::v5::{mqttbytes::QoS, Client, Connection, Event, MqttOptions};
use rumqttc::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::{MqttEndpoint, Publisher};
use crate::notify::OutboundMessage;

const REQUEST_CAPACITY: usize = 10;

#[derive(Clone, Debug)]
pub struct MqttSettings {
    pub endpoint: MqttEndpoint,
    pub topic: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fire-and-forget publisher.
///
/// Messages go out at QoS 0 through `try_publish`, so a slow or dead broker
/// never blocks the frame loop. The event loop runs on its own thread and
/// stops at the first connection error; there is no reconnect.
pub struct MqttPublisher {
    client: Client,
    topic: String,
    connected: Arc<AtomicBool>,
    connection_handle: Option<JoinHandle<()>>,
}

impl MqttPublisher {
    pub fn connect(settings: &MqttSettings) -> Result<Self> {
        if settings.topic.trim().is_empty() {
            return Err(anyhow!("MQTT topic must not be empty"));
        }
        let endpoint = &settings.endpoint;
        let mut options = MqttOptions::new(&settings.client_id, &endpoint.host, endpoint.port);
        options.set_keep_alive(Duration::from_secs(60));
        options.set_clean_start(true);
        if let Some(user) = settings.username.as_deref() {
            options.set_credentials(user, settings.password.as_deref().unwrap_or_default());
        }
        if endpoint.use_tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(true));
        let handle = spawn_event_loop(connection, connected.clone(), endpoint.to_string());
        log::info!(
            "MQTT publisher started for {} (topic: {}, client id: {})",
            endpoint,
            settings.topic,
            settings.client_id
        );
        Ok(Self {
            client,
            topic: settings.topic.clone(),
            connected,
            connection_handle: Some(handle),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

fn spawn_event_loop(
    mut connection: Connection,
    connected: Arc<AtomicBool>,
    broker: String,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(_)) | Ok(Event::Outgoing(_)) => {}
                Err(e) => {
                    log::warn!("MQTT connection to {} lost: {}", broker, e);
                    break;
                }
            }
        }
        connected.store(false, Ordering::SeqCst);
    })
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, message: &OutboundMessage) -> Result<()> {
        if !self.is_connected() {
            return Err(anyhow!("MQTT connection is down"));
        }
        self.client
            .try_publish(
                self.topic.clone(),
                QoS::AtMostOnce,
                false,
                message.payload().into_bytes(),
            )
            .map_err(|e| anyhow!("publish {} to {}: {}", message, self.topic, e))
    }

    fn close(&mut self) {
        if let Err(e) = self.client.disconnect() {
            log::debug!("MQTT disconnect: {}", e);
        }
        if let Some(handle) = self.connection_handle.take() {
            let _ = handle.join();
        }
    }
}
