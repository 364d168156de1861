//! `luacell-wasm-guest` — the `.wasm` artifact.
//!
//! Exports the compute ABI (PROTOCOL.md §3), imports the six host
//! functions under the `luacell_host` module (PROTOCOL.md §4), and owns
//! the two memory regions the boundary depends on: the 64 KiB I/O buffer
//! and the allocator region backing the Lua heap.
//!
//! Everything that touches raw imports or the process-wide runtime slot is
//! gated to `wasm32`; the allocator and buffer logic build everywhere so
//! they stay under native test.

pub mod alloc;
pub mod io_buffer;

#[cfg(target_arch = "wasm32")]
mod imports;
#[cfg(target_arch = "wasm32")]
mod host_bridge;
#[cfg(target_arch = "wasm32")]
mod exports;

#[cfg(target_arch = "wasm32")]
pub use exports::*;
