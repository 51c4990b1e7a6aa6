//! Outbound packet construction.
//!
//! Builds the serialized [`ServiceEnvelope`] for one text message and the
//! MQTT topic it is published to. The envelope layers are assembled fresh per
//! invocation and discarded once the bytes are produced.

use prost::Message;

use crate::mesh::address::NodeAddress;
use crate::mesh::proto::{Data, MeshPacket, PortNum, ServiceEnvelope, mesh_packet};
use crate::utils::error::SendError;

/// Generates a likely-unique 32-bit packet identifier.
///
/// The low 16 bits of the current millisecond timestamp fill the high half
/// and a random 16-bit value fills the low half. This is not collision-free
/// across processes; one message is sent per run, so "usually distinct within
/// one run" is enough for deduplication and ack tracking on the mesh.
pub fn generate_packet_id() -> u32 {
    let timestamp_ms = chrono::Utc::now().timestamp_millis() as u64;
    let random_component = rand::random::<u16>() as u32;
    (((timestamp_ms & 0xFFFF) as u32) << 16) | random_component
}

/// Builds the serialized protobuf envelope for one outbound text message.
///
/// `to` and `gateway` are textual node addresses and must decode through
/// [`NodeAddress::parse`]. The gateway is the packet source on the mesh, and
/// its original textual form (not the decoded integer) is carried in the
/// envelope's `gateway_id` routing metadata. `hop_limit` is taken as given;
/// the caller range-checks it to `[0,7]` before this point.
///
/// Fails fast with [`SendError::EmptyMessage`] or
/// [`SendError::InvalidAddress`]; no partial envelope is ever returned.
pub fn build_envelope(
    text: &str,
    to: &str,
    gateway: &str,
    channel: &str,
    want_ack: bool,
    hop_limit: u32,
) -> Result<Vec<u8>, SendError> {
    if text.trim().is_empty() {
        return Err(SendError::EmptyMessage);
    }

    let source = NodeAddress::parse(gateway)?;
    let dest = NodeAddress::parse(to)?;

    let data = Data {
        portnum: PortNum::TextMessageApp as i32,
        payload: text.as_bytes().to_vec(),
    };

    let packet = MeshPacket {
        source: source.as_u32(),
        dest: dest.as_u32(),
        channel: 0,
        payload_variant: Some(mesh_packet::PayloadVariant::Decoded(data)),
        id: generate_packet_id(),
        hop_limit,
        want_ack,
    };

    let envelope = ServiceEnvelope {
        packet: Some(packet),
        channel_id: channel.to_string(),
        gateway_id: gateway.to_string(),
    };

    Ok(envelope.encode_to_vec())
}

/// Builds the MQTT topic string for a Meshtastic envelope.
///
/// Pattern: `msh/<region>/2/e/<channel>/<gateway_id>`, where `2` is the protocol
/// version and `e` marks the protobuf envelope format (JSON topics use
/// `json` instead). Pure formatting; segments are taken verbatim.
pub fn build_topic(region: &str, channel: &str, gateway_id: &str) -> String {
    format!("msh/{region}/2/e/{channel}/{gateway_id}")
}
