//! The shared 64 KiB I/O buffer (PROTOCOL.md §3).
//!
//! One fixed region in linear memory. The host writes script source at
//! offset 0 before `compute`; the guest writes the result frame (or error
//! message) back at offset 0. While a compute call is running the host
//! keeps its hands off, so the same region doubles as the scratch area for
//! per-key host round-trips.

use std::ptr::addr_of_mut;

use luacell_primitives::IO_BUFFER_SIZE;

static mut IO_BUFFER: [u8; IO_BUFFER_SIZE] = [0; IO_BUFFER_SIZE];

/// Base pointer of the buffer.
pub fn base() -> *mut u8 {
    unsafe { addr_of_mut!(IO_BUFFER).cast() }
}

/// Buffer size in bytes. Always 65536.
pub fn size() -> usize {
    IO_BUFFER_SIZE
}

/// Copy `data` to offset 0.
///
/// # Safety
/// Single-threaded, non-reentrant execution only; `data` must not exceed
/// the buffer and must not itself alias the buffer.
pub unsafe fn write(data: &[u8]) {
    debug_assert!(data.len() <= IO_BUFFER_SIZE);
    unsafe { core::ptr::copy_nonoverlapping(data.as_ptr(), base(), data.len()) };
}

/// View the first `len` bytes.
///
/// # Safety
/// Single-threaded, non-reentrant execution only; the returned slice must
/// be dropped before anything writes the buffer again.
pub unsafe fn read(len: usize) -> &'static [u8] {
    debug_assert!(len <= IO_BUFFER_SIZE);
    unsafe { core::slice::from_raw_parts(base(), len) }
}
