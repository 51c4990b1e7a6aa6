//! Node addressing for the mesh.
//!
//! Meshtastic identifies nodes by a 32-bit integer. Humans write them as
//! `"!<hex>"` (the form printed on device screens), `"^all"` for broadcast,
//! or a bare decimal integer. This module converts the textual forms into
//! the wire integer.

use crate::utils::error::SendError;

/// A 32-bit mesh node address, or the reserved broadcast group.
///
/// Immutable once parsed; the inner value always fits in 32 bits by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress(u32);

impl NodeAddress {
    /// The reserved "all nodes" broadcast address.
    pub const BROADCAST: NodeAddress = NodeAddress(0xFFFF_FFFF);

    /// Parses a node address from its textual form.
    ///
    /// Accepted shapes:
    /// - `"^all"` (case-insensitive) for the broadcast address
    /// - `"!<hex>"` with the hex digits read as an unsigned 32-bit integer
    /// - a bare base-10 integer
    ///
    /// Any other shape fails with [`SendError::InvalidAddress`] naming the
    /// offending string. Never panics.
    pub fn parse(text: &str) -> Result<NodeAddress, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::InvalidAddress(String::new()));
        }

        if text.eq_ignore_ascii_case("^all") {
            return Ok(NodeAddress::BROADCAST);
        }

        if let Some(hex_str) = text.strip_prefix('!') {
            if hex_str.is_empty() {
                return Err(SendError::InvalidAddress(text.to_string()));
            }
            return u32::from_str_radix(hex_str, 16)
                .map(NodeAddress)
                .map_err(|_| SendError::InvalidAddress(text.to_string()));
        }

        text.parse::<u32>()
            .map(NodeAddress)
            .map_err(|_| SendError::InvalidAddress(text.to_string()))
    }

    /// Returns the wire integer form of the address.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
