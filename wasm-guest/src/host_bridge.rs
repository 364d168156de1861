//! WASM host bridge — implements `TableHost` over the raw imports.
//!
//! Each method marshals slices to pointer/length pairs, calls the import,
//! checks the sign of the result, and copies returned bytes out of the
//! scratch region. The scratch region is the I/O buffer itself: while a
//! compute call runs the host does not touch the buffer, and the script
//! source is copied out before execution starts, so the whole 64 KiB is
//! free for per-key round-trips.

use luacell_hostapi::{HostError, TableHost};

use crate::imports;
use crate::io_buffer;

/// The guest-side host handle.
pub struct WasmHost;

impl WasmHost {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WasmHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TableHost for WasmHost {
    fn table_set(&mut self, id: u32, key: &[u8], value: &[u8]) -> Result<(), HostError> {
        let code = unsafe {
            imports::ext_table_set(
                id,
                key.as_ptr() as i32,
                key.len() as i32,
                value.as_ptr() as i32,
                value.len() as i32,
            )
        };
        if code < 0 {
            return Err(HostError::CallbackFailed { call: "ext_table_set", code });
        }
        Ok(())
    }

    fn table_get(&mut self, id: u32, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        let len = unsafe {
            imports::ext_table_get(
                id,
                key.as_ptr() as i32,
                key.len() as i32,
                io_buffer::base() as i32,
                io_buffer::size() as i32,
            )
        };
        // Negative covers both "absent" and host-side failure; either way
        // the read becomes nil upstream.
        if len < 0 {
            return Ok(None);
        }
        let bytes = unsafe { io_buffer::read(len as usize) };
        Ok(Some(bytes.to_vec()))
    }

    fn table_delete(&mut self, id: u32, key: &[u8]) -> Result<(), HostError> {
        let code = unsafe {
            imports::ext_table_delete(id, key.as_ptr() as i32, key.len() as i32)
        };
        if code < 0 {
            return Err(HostError::CallbackFailed { call: "ext_table_delete", code });
        }
        Ok(())
    }

    fn table_size(&mut self, id: u32) -> Result<u32, HostError> {
        let count = unsafe { imports::ext_table_size(id) };
        if count < 0 {
            return Err(HostError::CallbackFailed { call: "ext_table_size", code: count });
        }
        Ok(count as u32)
    }

    fn table_keys(&mut self, id: u32) -> Result<Vec<u8>, HostError> {
        let len = unsafe {
            imports::ext_table_keys(id, io_buffer::base() as i32, io_buffer::size() as i32)
        };
        if len < 0 {
            return Err(HostError::KeysOverflow { cap: io_buffer::size() });
        }
        let bytes = unsafe { io_buffer::read(len as usize) };
        Ok(bytes.to_vec())
    }

    fn now_millis(&mut self) -> i64 {
        unsafe { imports::time_now() }
    }
}
