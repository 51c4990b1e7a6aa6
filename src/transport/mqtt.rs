//! MQTT client for publishing binary protobuf envelopes to Meshtastic brokers.
//!
//! The rumqttc event loop runs on a spawned tokio task (the pump) and forwards
//! the broker events the caller cares about (connection accept/reject,
//! delivery acknowledgment, network errors) over an mpsc channel. `connect`
//! and `publish` await that channel against a deadline, so the asynchronous
//! broker handshake is surfaced to the caller as a plain blocking call with a
//! timeout. Exactly one publish is in flight per client instance.

use std::time::{Duration, Instant};

use rumqttc::{AsyncClient, ConnectReturnCode, ConnectionError, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::utils::error::SendError;

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection life-cycle of an [`MqttTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Broker events forwarded from the event-loop pump to the waiting caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrokerEvent {
    /// CONNACK with a success code.
    Accepted,
    /// CONNACK with a refusal code (the raw MQTT return code).
    Rejected(u8),
    /// PUBACK for the given packet id.
    Acked(u16),
    /// The event loop hit a network error and stopped.
    ConnectionLost(String),
}

/// MQTT client for one-shot delivery of a serialized envelope.
///
/// Life-cycle: `connect` → `publish` → `disconnect`. After `disconnect` the
/// handle is spent; a fresh instance is needed for another connection.
pub struct MqttTransport {
    server: String,
    port: u16,
    username: String,
    password: String,
    ack_timeout: Duration,
    state: ConnectionState,
    client: Option<AsyncClient>,
    events: Option<UnboundedReceiver<BrokerEvent>>,
    pump: Option<JoinHandle<()>>,
}

impl MqttTransport {
    /// Creates a disconnected client for the given broker endpoint.
    pub fn new(server: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            server: server.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            state: ConnectionState::Disconnected,
            client: None,
            events: None,
            pump: None,
        }
    }

    /// Current life-cycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Establishes the broker connection, waiting up to `timeout` for the
    /// CONNACK handshake.
    ///
    /// Outcomes: broker accepts → `Ok`; broker refuses →
    /// [`SendError::ConnectionRejected`] with the refusal reason; network
    /// failure → [`SendError::ConnectionFailed`]; no response within the
    /// deadline → [`SendError::ConnectionTimeout`]. Any failure folds the
    /// client back to [`ConnectionState::Disconnected`]. No retries happen
    /// here; retry policy belongs to the caller.
    pub async fn connect(&mut self, timeout: Duration) -> Result<(), SendError> {
        let client_id = format!("meshtastic-send-{:08x}", rand::random::<u32>());
        let mut options = MqttOptions::new(client_id, self.server.clone(), self.port);
        options.set_keep_alive(KEEP_ALIVE);
        if !self.username.is_empty() && !self.password.is_empty() {
            options.set_credentials(self.username.clone(), self.password.clone());
        }

        debug!("connecting to MQTT broker at {}:{}", self.server, self.port);
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let pump = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        let event = match ack.code {
                            ConnectReturnCode::Success => BrokerEvent::Accepted,
                            code => BrokerEvent::Rejected(reject_code(code)),
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(Event::Incoming(Packet::PubAck(ack))) => {
                        if tx.send(BrokerEvent::Acked(ack.pkid)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    // rumqttc finishes the handshake inside poll(), so a
                    // refused CONNACK surfaces as a poll error rather than
                    // as an incoming ConnAck event.
                    Err(ConnectionError::ConnectionRefused(code)) => {
                        let _ = tx.send(BrokerEvent::Rejected(reject_code(code)));
                        break;
                    }
                    Err(e) => {
                        let _ = tx.send(BrokerEvent::ConnectionLost(e.to_string()));
                        break;
                    }
                }
            }
        });

        self.state = ConnectionState::Connecting;
        self.client = Some(client);
        self.pump = Some(pump);

        match await_connack(&mut rx, timeout).await {
            Ok(()) => {
                self.events = Some(rx);
                self.state = ConnectionState::Connected;
                info!("connected to MQTT broker at {}:{}", self.server, self.port);
                Ok(())
            }
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    /// Publishes a binary payload with QoS 1 (at least once) and blocks until
    /// the broker acknowledges receipt.
    ///
    /// Requires an established connection ([`SendError::NotConnected`]
    /// otherwise) and a non-empty byte payload
    /// ([`SendError::InvalidPayload`]). Delivery failures (full send queue,
    /// lost connection, missing acknowledgment) surface as
    /// [`SendError::PublishFailed`]; nothing is republished automatically.
    pub async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SendError> {
        if payload.is_empty() {
            return Err(SendError::InvalidPayload);
        }
        if self.state != ConnectionState::Connected {
            return Err(SendError::NotConnected);
        }
        let client = self.client.as_ref().ok_or(SendError::NotConnected)?;

        debug!("publishing {} bytes to topic {}", payload.len(), topic);
        client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| SendError::PublishFailed(e.to_string()))?;

        let events = self.events.as_mut().ok_or(SendError::NotConnected)?;
        await_puback(events, self.ack_timeout).await?;
        info!("message published successfully to {topic}");
        Ok(())
    }

    /// Disconnects from the broker and stops the event-loop pump.
    ///
    /// Idempotent and infallible: teardown errors are logged and swallowed,
    /// because this is the guaranteed cleanup step. Afterwards the state is
    /// [`ConnectionState::Disconnected`] and the handle is spent.
    pub async fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            debug!("disconnecting from MQTT broker");
            if let Err(e) = client.disconnect().await {
                warn!("error during disconnect: {e}");
            }
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.events = None;
        if self.state == ConnectionState::Connected {
            info!("disconnected from MQTT broker");
        }
        self.state = ConnectionState::Disconnected;
    }
}

/// Waits for the connection handshake decision, bounded by `deadline`.
pub(crate) async fn await_connack(
    events: &mut UnboundedReceiver<BrokerEvent>,
    deadline: Duration,
) -> Result<(), SendError> {
    let started = Instant::now();
    loop {
        let remaining = deadline
            .checked_sub(started.elapsed())
            .ok_or(SendError::ConnectionTimeout(deadline.as_secs()))?;
        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Some(BrokerEvent::Accepted)) => return Ok(()),
            Ok(Some(BrokerEvent::Rejected(code))) => {
                return Err(SendError::ConnectionRejected(reject_reason(code)));
            }
            Ok(Some(BrokerEvent::ConnectionLost(e))) => {
                return Err(SendError::ConnectionFailed(e));
            }
            // A stray ack cannot arrive before CONNACK; skip it if it does.
            Ok(Some(BrokerEvent::Acked(_))) => continue,
            Ok(None) => {
                return Err(SendError::ConnectionFailed(
                    "event loop terminated before handshake".to_string(),
                ));
            }
            Err(_) => return Err(SendError::ConnectionTimeout(deadline.as_secs())),
        }
    }
}

/// Waits for the broker's PUBACK, bounded by `deadline`.
pub(crate) async fn await_puback(
    events: &mut UnboundedReceiver<BrokerEvent>,
    deadline: Duration,
) -> Result<(), SendError> {
    let started = Instant::now();
    let timed_out = || {
        SendError::PublishFailed(format!(
            "no acknowledgment from broker within {} seconds",
            deadline.as_secs()
        ))
    };
    loop {
        let remaining = deadline.checked_sub(started.elapsed()).ok_or_else(timed_out)?;
        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Some(BrokerEvent::Acked(pkid))) => {
                debug!("broker acknowledged delivery (pkid {pkid})");
                return Ok(());
            }
            Ok(Some(BrokerEvent::ConnectionLost(e))) => {
                return Err(SendError::PublishFailed(e));
            }
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(SendError::PublishFailed(
                    "event loop terminated before acknowledgment".to_string(),
                ));
            }
            Err(_) => return Err(timed_out()),
        }
    }
}

/// Lowers a rumqttc refusal code to the raw MQTT return code.
fn reject_code(code: ConnectReturnCode) -> u8 {
    match code {
        ConnectReturnCode::Success => 0,
        ConnectReturnCode::RefusedProtocolVersion => 1,
        ConnectReturnCode::BadClientId => 2,
        ConnectReturnCode::ServiceUnavailable => 3,
        ConnectReturnCode::BadUserNamePassword => 4,
        ConnectReturnCode::NotAuthorized => 5,
    }
}

/// Human-readable reason for an MQTT v3.1.1 connection refusal code.
pub(crate) fn reject_reason(code: u8) -> String {
    match code {
        1 => "incorrect protocol version".to_string(),
        2 => "invalid client identifier".to_string(),
        3 => "server unavailable".to_string(),
        4 => "bad username or password".to_string(),
        5 => "not authorized".to_string(),
        other => format!("unknown error (code {other})"),
    }
}
