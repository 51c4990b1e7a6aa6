//! The `transport` module is responsible for delivering the encoded envelope
//! to the MQTT broker.
//!
//! It implements a connection-oriented MQTT client with an explicit
//! life-cycle (disconnected → connecting → connected), QoS 1 publishing, and
//! guaranteed-quiet teardown.

pub mod mqtt;

pub use mqtt::MqttTransport;

#[cfg(test)]
mod tests;
