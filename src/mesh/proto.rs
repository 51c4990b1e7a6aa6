//! Meshtastic protobuf message definitions.
//!
//! Message types are defined with prost derive macros for compatibility with
//! the Meshtastic protocol; field numbers and types come from the public
//! Meshtastic schema (`mqtt.proto`, `mesh.proto`, `portnums.proto`) and must
//! not be changed. Only the subset of fields this tool writes is declared;
//! protobuf readers skip tags they do not know, and unknown tags on decode do
//! not occur here because the tool never decodes foreign packets.
//!
//! ```text
//! ServiceEnvelope (MQTT transport wrapper)
//!   ├── packet: MeshPacket (routing header)
//!   │     └── decoded: Data (portnum + payload bytes)
//!   ├── channel_id: channel name used for topic routing
//!   └── gateway_id: gateway node id string used for topic routing
//! ```

/// Application port numbers identifying the payload type inside [`Data`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PortNum {
    /// Deprecated/unset.
    UnknownApp = 0,
    /// Plain UTF-8 text messages.
    TextMessageApp = 1,
}

/// The innermost application payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Data {
    /// Which application the payload belongs to.
    #[prost(enumeration = "PortNum", tag = "1")]
    pub portnum: i32,

    /// Raw application bytes; UTF-8 text for `TextMessageApp`.
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

/// A mesh packet: routing header plus one payload variant.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MeshPacket {
    /// Sending node address (wire name `from`; `fixed32` on the wire).
    #[prost(fixed32, tag = "1")]
    pub source: u32,

    /// Destination node address, or `0xFFFFFFFF` for broadcast.
    #[prost(fixed32, tag = "2")]
    pub dest: u32,

    /// Channel slot index on the receiving device (0 = primary).
    #[prost(uint32, tag = "3")]
    pub channel: u32,

    #[prost(oneof = "mesh_packet::PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<mesh_packet::PayloadVariant>,

    /// Packet identifier for deduplication and ack tracking.
    #[prost(fixed32, tag = "6")]
    pub id: u32,

    /// Remaining mesh relays before the packet is dropped.
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,

    /// Whether the sender wants a delivery acknowledgment.
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
}

pub mod mesh_packet {
    /// The packet body: either a cleartext [`Data`](super::Data) or an
    /// AES-encrypted blob (not produced by this tool).
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "4")]
        Decoded(super::Data),
        #[prost(bytes = "vec", tag = "5")]
        Encrypted(Vec<u8>),
    }
}

/// The outermost wrapper used for MQTT transport.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceEnvelope {
    /// The wrapped mesh packet.
    #[prost(message, optional, tag = "1")]
    pub packet: Option<MeshPacket>,

    /// Channel name string, e.g. `"LongFast"`.
    #[prost(string, tag = "2")]
    pub channel_id: String,

    /// Gateway node id string, e.g. `"!12345678"`.
    #[prost(string, tag = "3")]
    pub gateway_id: String,
}
