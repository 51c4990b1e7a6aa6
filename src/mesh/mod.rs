//! The `mesh` module implements the Meshtastic message-encoding pipeline.
//!
//! It covers node addressing, packet-identifier generation, construction of
//! the three-layer protobuf envelope (`Data` → `MeshPacket` →
//! `ServiceEnvelope`), and the MQTT topic string the envelope is published to.

pub mod address;
pub mod packet;
pub mod proto;

pub use address::NodeAddress;
pub use packet::{build_envelope, build_topic, generate_packet_id};
