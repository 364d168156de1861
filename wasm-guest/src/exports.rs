//! Guest exported functions (PROTOCOL.md §3).
//!
//! The exports wrap one process-wide [`Runtime`] living in a static slot.
//! Execution is single-threaded and non-reentrant by contract, which is
//! what makes the `static mut` sound: no export runs while another is in
//! progress.
//!
//! Exports must never panic — panics in WASM trap the instance. Fallible
//! paths either return a negative length with a message in the I/O buffer
//! (`compute`) or go quiet (`attach_memory_table` and friends, whose ABI
//! returns nothing).

use std::ptr::addr_of_mut;

use luacell_primitives::{MemoryStats, IO_BUFFER_SIZE};
use luacell_runtime::{ComputeError, Runtime};

use crate::alloc::{self, Region, DEFAULT_REGION_CAPACITY};
use crate::host_bridge::WasmHost;
use crate::io_buffer;

static mut RUNTIME: Option<Runtime<WasmHost>> = None;
static mut REGION: Option<&'static mut Region> = None;

fn runtime() -> Option<&'static mut Runtime<WasmHost>> {
    unsafe { (*addr_of_mut!(RUNTIME)).as_mut() }
}

/// Create the allocator region, the Lua state on top of it, and the
/// well-known globals. Returns 0 on success, negative on failure.
#[no_mangle]
pub extern "C" fn init() -> i32 {
    if runtime().is_some() {
        return -1; // already initialized
    }

    let Some(region) = alloc::grow_region(DEFAULT_REGION_CAPACITY) else {
        return -2;
    };
    let region: &'static mut Region = Box::leak(Box::new(region));
    let region_ptr = region as *mut Region;
    unsafe { *addr_of_mut!(REGION) = Some(region) };

    // Every Lua allocation goes through the region from the first byte.
    let lua = unsafe {
        let state = mlua::ffi::lua_newstate(alloc::lua_alloc, region_ptr.cast());
        if state.is_null() {
            return -2;
        }
        mlua::Lua::init_from_ptr(state)
    };

    match Runtime::with_lua(lua, WasmHost::new()) {
        Ok(rt) => {
            unsafe { *addr_of_mut!(RUNTIME) = Some(rt) };
            0
        }
        Err(_) => -3,
    }
}

/// Run a script (PROTOCOL.md §2). Positive return = frame length,
/// negative = message length; the bytes sit at the buffer base either way.
#[no_mangle]
pub extern "C" fn compute(script_ptr: i32, script_len: i32) -> i32 {
    let Some(rt) = runtime() else {
        return fail("internal: runtime is not initialized");
    };
    if script_len < 0 {
        return fail("internal: negative script length");
    }
    // Length is validated before a single source byte is read: a stated
    // length past the I/O buffer would walk off the end of it.
    if script_len as usize > IO_BUFFER_SIZE {
        let err = ComputeError::InvalidLength { len: script_len as usize, max: IO_BUFFER_SIZE };
        return fail(&err.message());
    }

    // Copy the source out — the buffer doubles as the host-call scratch
    // region once execution starts.
    let script =
        unsafe { core::slice::from_raw_parts(script_ptr as *const u8, script_len as usize) }
            .to_vec();

    match rt.compute(&script) {
        Ok(frame) => {
            unsafe { io_buffer::write(&frame) };
            frame.len() as i32
        }
        Err(err) => fail(&err.message()),
    }
}

/// Base of the 64 KiB I/O buffer.
#[no_mangle]
pub extern "C" fn get_buffer_ptr() -> i32 {
    io_buffer::base() as i32
}

/// Size of the I/O buffer.
#[no_mangle]
pub extern "C" fn get_buffer_size() -> i32 {
    io_buffer::size() as i32
}

/// Current `_home` ID.
#[no_mangle]
pub extern "C" fn get_memory_table_id() -> u32 {
    runtime().map_or(0, |rt| rt.memory_table_id())
}

/// Rebind `_home` to a persisted ID (PROTOCOL.md §8).
#[no_mangle]
pub extern "C" fn attach_memory_table(id: u32) {
    if let Some(rt) = runtime() {
        let _ = rt.attach_memory_table(id);
    }
}

/// Current `_io` ID.
#[no_mangle]
pub extern "C" fn get_io_table_id() -> u32 {
    runtime().map_or(0, |rt| rt.io_table_id())
}

/// Delete the three `_io` sub-slots.
#[no_mangle]
pub extern "C" fn clear_io_table() {
    if let Some(rt) = runtime() {
        let _ = rt.clear_io_table();
    }
}

/// Raise the ID allocator past every persisted ID.
#[no_mangle]
pub extern "C" fn sync_external_table_counter(next_id: u32) {
    if let Some(rt) = runtime() {
        rt.sync_external_table_counter(next_id);
    }
}

/// Toggle the legacy `Memory` alias.
#[no_mangle]
pub extern "C" fn set_memory_alias_enabled(enabled: i32) {
    if let Some(rt) = runtime() {
        let _ = rt.set_memory_alias_enabled(enabled != 0);
    }
}

/// Run a full GC cycle.
#[no_mangle]
pub extern "C" fn run_gc() {
    if let Some(rt) = runtime() {
        let _ = rt.run_gc();
    }
}

/// Write the 16-byte stats struct (PROTOCOL.md §5) at `out`.
#[no_mangle]
pub extern "C" fn get_memory_stats(out: i32) {
    let mut stats = runtime().map_or_else(MemoryStats::default, |rt| rt.memory_stats());
    if let Some(region) = unsafe { (*addr_of_mut!(REGION)).as_mut() } {
        stats.region_used_bytes = region.used() as u32;
        stats.region_capacity_bytes = region.capacity() as u32;
    }
    unsafe { core::ptr::write(out as *mut MemoryStats, stats) };
}

/// Write an error message into the buffer and return its negated length.
fn fail(message: &str) -> i32 {
    let bytes = message.as_bytes();
    let len = bytes.len().min(io_buffer::size());
    unsafe { io_buffer::write(&bytes[..len]) };
    -(len as i32)
}
