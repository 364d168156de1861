//! Core constants and shared types for the luacell runtime.
//!
//! These are used across the runtime, the WASM guest, and embedding hosts.

use alloc::string::String;

/// Size of the shared I/O buffer (PROTOCOL.md §3). Script source comes in
/// through it, result frames and error messages go out through it.
pub const IO_BUFFER_SIZE: usize = 65_536;

/// Capture limit for print output within one compute call. Leaves room in
/// the I/O buffer for the frame header and a small encoded value.
pub const OUTPUT_CAPACITY: usize = IO_BUFFER_SIZE - 512;

/// Marker appended when captured output is cut short (PROTOCOL.md §2).
pub const OUTPUT_ELLIPSIS: &[u8] = b"...";

/// Raw field on a proxy table recording its external table ID.
///
/// The field is set with a raw assignment so reads and writes of this one
/// key never reach the metamethods.
pub const EXT_ID_FIELD: &str = "__ext_table_id";

/// First four bytes of a Lua 5.4 binary chunk (PROTOCOL.md §6).
pub const LUA_SIGNATURE: [u8; 4] = [0x1B, b'L', b'u', b'a'];

/// WASM module name the host imports are linked under (PROTOCOL.md §4).
pub const HOST_MODULE: &str = "luacell_host";

/// Largest encoded value accepted for a single table entry. One entry must
/// fit through the I/O buffer scratch region in a single host round-trip.
pub const MAX_VALUE_LEN: usize = IO_BUFFER_SIZE;

/// Memory statistics written by the `get_memory_stats` export
/// (PROTOCOL.md §5). Field order is the wire order; all fields u32 LE.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes currently held by the Lua heap.
    pub lua_heap_bytes: u32,
    /// Bytes in use inside the allocator region (0 outside WASM).
    pub region_used_bytes: u32,
    /// Total allocator region capacity (0 outside WASM).
    pub region_capacity_bytes: u32,
    /// Size of the shared I/O buffer.
    pub io_buffer_bytes: u32,
}

/// Render an integer table key the way Lua's `tostring` does: decimal,
/// no leading zeros, `-` prefix for negatives.
pub fn integer_key(n: i64) -> String {
    let mut s = String::new();
    use core::fmt::Write;
    let _ = write!(s, "{}", n);
    s
}

/// Returns true if `key` contains the reserved key-list separator byte.
pub fn key_has_newline(key: &[u8]) -> bool {
    key.contains(&0x0A)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_key_formatting() {
        assert_eq!(integer_key(0), "0");
        assert_eq!(integer_key(42), "42");
        assert_eq!(integer_key(-7), "-7");
        assert_eq!(integer_key(i64::MAX), "9223372036854775807");
        assert_eq!(integer_key(i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn test_key_newline_detection() {
        assert!(!key_has_newline(b"counter"));
        assert!(!key_has_newline(b""));
        assert!(key_has_newline(b"a\nb"));
        assert!(key_has_newline(b"\n"));
    }

    #[test]
    fn test_memory_stats_layout() {
        // The struct crosses the ABI as four packed u32 fields.
        assert_eq!(core::mem::size_of::<MemoryStats>(), 16);
    }
}
