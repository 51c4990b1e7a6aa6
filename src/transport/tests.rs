use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::mqtt::{
    BrokerEvent, ConnectionState, MqttTransport, await_connack, await_puback, reject_reason,
};
use crate::utils::error::SendError;

// MQTT v3.1.1 CONNACK: fixed header 0x20, remaining length 2,
// session-present flag, return code.
fn connack(code: u8) -> [u8; 4] {
    [0x20, 0x02, 0x00, code]
}

// Minimal in-process broker: accepts one TCP connection, swallows the
// CONNECT packet, and replies with the given CONNACK return code (or stays
// silent when `reply` is None). Returns the bound port.
async fn spawn_fake_broker(reply: Option<u8>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            if let Some(code) = reply {
                let _ = stream.write_all(&connack(code)).await;
                let _ = stream.flush().await;
            }
            // Hold the socket open so the client side reads the reply (or
            // keeps waiting) instead of seeing an early close.
            loop {
                match tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await {
                    Ok(Ok(n)) if n > 0 => continue,
                    _ => break,
                }
            }
        }
    });

    port
}

// Helpers below drive the same wait functions the client uses at runtime,
// with events injected instead of a live broker.

#[tokio::test]
async fn connack_accept_succeeds() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(BrokerEvent::Accepted).unwrap();

    await_connack(&mut rx, Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn connack_reject_code_4_mentions_bad_credentials() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(BrokerEvent::Rejected(4)).unwrap();

    match await_connack(&mut rx, Duration::from_secs(1)).await {
        Err(SendError::ConnectionRejected(reason)) => {
            assert!(reason.contains("bad username or password"), "reason: {reason}");
        }
        other => panic!("expected ConnectionRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn connack_silence_times_out() {
    // Keep the sender alive so the channel stays open but silent.
    let (_tx, mut rx) = mpsc::unbounded_channel::<BrokerEvent>();

    match await_connack(&mut rx, Duration::from_millis(50)).await {
        Err(SendError::ConnectionTimeout(_)) => {}
        other => panic!("expected ConnectionTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn connack_network_error_reports_connection_failed() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(BrokerEvent::ConnectionLost("connection refused (os error 111)".into()))
        .unwrap();

    match await_connack(&mut rx, Duration::from_secs(1)).await {
        Err(SendError::ConnectionFailed(msg)) => assert!(msg.contains("os error 111")),
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn puback_confirms_delivery() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(BrokerEvent::Acked(7)).unwrap();

    await_puback(&mut rx, Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn puback_silence_reports_publish_failed() {
    let (_tx, mut rx) = mpsc::unbounded_channel::<BrokerEvent>();

    match await_puback(&mut rx, Duration::from_millis(50)).await {
        Err(SendError::PublishFailed(msg)) => assert!(msg.contains("no acknowledgment")),
        other => panic!("expected PublishFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn puback_connection_loss_reports_publish_failed() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(BrokerEvent::ConnectionLost("broker closed the connection".into()))
        .unwrap();

    match await_puback(&mut rx, Duration::from_secs(1)).await {
        Err(SendError::PublishFailed(_)) => {}
        other => panic!("expected PublishFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn publish_before_connect_fails_with_not_connected() {
    let mut transport = MqttTransport::new("localhost", 1883, "", "");

    match transport.publish("msh/US/2/e/LongFast/!12345678", b"payload").await {
        Err(SendError::NotConnected) => {}
        other => panic!("expected NotConnected, got {other:?}"),
    }
}

#[tokio::test]
async fn publish_rejects_empty_payload() {
    let mut transport = MqttTransport::new("localhost", 1883, "", "");

    match transport.publish("msh/US/2/e/LongFast/!12345678", b"").await {
        Err(SendError::InvalidPayload) => {}
        other => panic!("expected InvalidPayload, got {other:?}"),
    }
}

#[tokio::test]
async fn disconnect_without_connect_never_fails() {
    let mut transport = MqttTransport::new("localhost", 1883, "user", "pass");
    assert_eq!(transport.state(), ConnectionState::Disconnected);

    // Must not panic, twice over (idempotent).
    transport.disconnect().await;
    transport.disconnect().await;
    assert_eq!(transport.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_accepted_by_broker_reaches_connected() {
    let port = spawn_fake_broker(Some(0x00)).await;
    let mut transport = MqttTransport::new("127.0.0.1", port, "", "");

    transport.connect(Duration::from_secs(3)).await.unwrap();
    assert_eq!(transport.state(), ConnectionState::Connected);

    transport.disconnect().await;
    assert_eq!(transport.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_refused_by_broker_reports_rejection_reason() {
    // Return code 4: bad username or password. rumqttc surfaces the refusal
    // as a poll error, and the pump must still map it to the reason table.
    let port = spawn_fake_broker(Some(0x04)).await;
    let mut transport = MqttTransport::new("127.0.0.1", port, "user", "wrong");

    match transport.connect(Duration::from_secs(3)).await {
        Err(SendError::ConnectionRejected(reason)) => {
            assert!(reason.contains("bad username or password"), "reason: {reason}");
        }
        other => panic!("expected ConnectionRejected, got {other:?}"),
    }
    assert_eq!(transport.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_with_silent_broker_times_out() {
    // The broker accepts the socket but never answers the handshake.
    let port = spawn_fake_broker(None).await;
    let mut transport = MqttTransport::new("127.0.0.1", port, "", "");

    match transport.connect(Duration::from_millis(200)).await {
        Err(SendError::ConnectionTimeout(_)) => {}
        other => panic!("expected ConnectionTimeout, got {other:?}"),
    }
    assert_eq!(transport.state(), ConnectionState::Disconnected);

    transport.disconnect().await;
    assert_eq!(transport.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn failed_connect_leaves_client_disconnected() {
    // Connecting to a closed port fails at the network layer, well before
    // any handshake; the failure must fold the client back to Disconnected.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener); // free the port so the connect is refused

    let mut transport = MqttTransport::new("127.0.0.1", port, "", "");
    let result = transport.connect(Duration::from_millis(500)).await;
    assert!(result.is_err());
    assert_eq!(transport.state(), ConnectionState::Disconnected);

    transport.disconnect().await;
    assert_eq!(transport.state(), ConnectionState::Disconnected);
}

#[test]
fn reject_reason_covers_known_codes() {
    assert_eq!(reject_reason(1), "incorrect protocol version");
    assert_eq!(reject_reason(2), "invalid client identifier");
    assert_eq!(reject_reason(3), "server unavailable");
    assert_eq!(reject_reason(4), "bad username or password");
    assert_eq!(reject_reason(5), "not authorized");
}

#[test]
fn reject_reason_echoes_unknown_codes() {
    assert_eq!(reject_reason(42), "unknown error (code 42)");
}
