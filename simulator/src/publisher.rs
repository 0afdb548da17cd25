use crate::config::SimulatorConfig;
use crate::errors::{Error, Result};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const REQUEST_CAPACITY: usize = 1000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound side of the simulator: something readings can be sent to.
#[allow(async_fn_in_trait)]
pub trait Publish {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

/// Publishes readings over a live MQTT connection.
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
    driver: JoinHandle<()>,
}

impl MqttPublisher {
    /// Connects to the broker and waits for its CONNACK.
    ///
    /// The event loop is then handed to a background task; it is not
    /// restarted if the connection drops.
    pub async fn connect(config: &SimulatorConfig) -> Result<Self> {
        info!(
            "Connecting to MQTT broker at {}:{} as {}",
            config.host, config.port, config.client_id
        );

        let mut mqtt_options = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqtt_options.set_keep_alive(config.keep_alive);
        mqtt_options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);

        let handshake = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        return match ack.code {
                            ConnectReturnCode::Success => Ok(()),
                            code => Err(Error::Connection(format!(
                                "broker refused connection: {:?}",
                                code
                            ))),
                        };
                    }
                    Ok(_) => {}
                    Err(e) => return Err(Error::Connection(e.to_string())),
                }
            }
        };

        tokio::time::timeout(CONNECT_TIMEOUT, handshake)
            .await
            .map_err(|_| {
                Error::Connection(format!("no CONNACK within {:?}", CONNECT_TIMEOUT))
            })??;

        info!("Connected to MQTT broker at {}:{}", config.host, config.port);

        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        debug!("Disconnect flushed, stopping event loop");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("MQTT eventloop error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            client,
            qos: config.qos,
            driver,
        })
    }

    /// Sends DISCONNECT and gives the event loop a moment to flush it.
    pub async fn disconnect(self) -> Result<()> {
        let requested = self.client.disconnect().await;

        match tokio::time::timeout(DISCONNECT_TIMEOUT, self.driver).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("MQTT event loop task failed: {}", e),
            Err(_) => warn!(
                "MQTT event loop did not stop within {:?}",
                DISCONNECT_TIMEOUT
            ),
        }

        requested.map_err(Error::Publish)
    }
}

impl Publish for MqttPublisher {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client.publish(topic, self.qos, false, payload).await?;
        Ok(())
    }
}
