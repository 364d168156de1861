//! Host API trait — the Rust-level mirror of the guest's imports.
//!
//! Each method corresponds to one function in PROTOCOL.md §4. The runtime
//! calls these from inside proxy metamethods, so every call is one
//! synchronous round-trip per key access; implementations must not block
//! on anything slower than their own storage.

use crate::error::HostError;

/// Host-side implementation of the external-table callbacks.
///
/// Values are opaque encoded blobs (PROTOCOL.md §1); the host stores and
/// returns them byte-identical. Keys are raw bytes without 0x0A.
///
/// Tables come into existence lazily: the first `table_set` against an
/// unknown ID creates its map, and `table_get`/`table_size`/`table_keys`
/// treat an unknown ID as an empty map rather than an error.
pub trait TableHost {
    /// Upsert one key.
    fn table_set(&mut self, id: u32, key: &[u8], value: &[u8]) -> Result<(), HostError>;

    /// Read one key. `Ok(None)` when the key (or the whole table) is absent.
    fn table_get(&mut self, id: u32, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Delete one key. Idempotent — deleting an absent key succeeds.
    fn table_delete(&mut self, id: u32, key: &[u8]) -> Result<(), HostError>;

    /// Number of live entries. Unknown tables count 0.
    fn table_size(&mut self, id: u32) -> Result<u32, HostError>;

    /// All keys, joined with 0x0A. Empty tables yield an empty buffer.
    /// No ordering is guaranteed.
    fn table_keys(&mut self, id: u32) -> Result<Vec<u8>, HostError>;

    /// Milliseconds from the host clock — the guest's only time source.
    fn now_millis(&mut self) -> i64;
}
