//! The `error` module defines the error taxonomy for the message pipeline.
//!
//! Every failure the core can produce is a reported outcome, never a panic.
//! Each variant carries enough context (offending string, reason, elapsed
//! time) to be logged verbatim without a stack trace.

use thiserror::Error;

/// Errors produced by the encoding and delivery pipeline.
#[derive(Debug, Error)]
pub enum SendError {
    /// Malformed node-address text (empty, bad hex, bad decimal).
    #[error("invalid node address: {0:?} (expected '!<hex>', '^all', or a decimal integer)")]
    InvalidAddress(String),

    /// Message text was empty or whitespace-only.
    #[error("message text cannot be empty")]
    EmptyMessage,

    /// Low-level network failure while establishing the broker connection.
    #[error("failed to connect to MQTT broker: {0}")]
    ConnectionFailed(String),

    /// The broker actively refused the connection handshake.
    #[error("connection refused by MQTT broker: {0}")]
    ConnectionRejected(String),

    /// No handshake response from the broker within the deadline.
    #[error("connection to MQTT broker timed out after {0} seconds")]
    ConnectionTimeout(u64),

    /// Publish attempted without an established connection.
    #[error("not connected to MQTT broker; call connect() first")]
    NotConnected,

    /// Publish was handed a degenerate (empty) byte payload.
    #[error("payload must be a non-empty byte sequence")]
    InvalidPayload,

    /// Broker-side delivery failure (queue full, connection lost, missing ack).
    #[error("failed to publish message: {0}")]
    PublishFailed(String),
}
