//! Session metadata — what a host must persist besides the table maps.
//!
//! Restoring a session needs exactly two numbers: the `_home` table ID and
//! a counter value past every stored ID (PROTOCOL.md §8). `SessionMeta`
//! carries both, with a fixed 8-byte little-endian encoding for hosts that
//! store it as a blob and serde derives for hosts that store it structured.

use serde::{Deserialize, Serialize};

/// The metadata record a host persists alongside its table maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// ID of the persistent `_home` table.
    pub memory_table_id: u32,
    /// Counter value to sync into the guest before attaching.
    pub next_table_id: u32,
}

impl SessionMeta {
    /// Fixed-size encoding: two u32 LE.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(&self.memory_table_id.to_le_bytes());
        buf[4..].copy_from_slice(&self.next_table_id.to_le_bytes());
        buf
    }

    /// Decode from the fixed encoding. `None` if too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 {
            return None;
        }
        Some(Self {
            memory_table_id: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            next_table_id: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}
