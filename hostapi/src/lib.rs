//! `luacell-hostapi` — host-side contract for the luacell runtime.
//!
//! The guest sees exactly six host functions (PROTOCOL.md §4): five
//! external-table callbacks and a clock. [`TableHost`] is the Rust-level
//! mirror of that surface; the WASM guest implements it over raw imports,
//! and tests or native embedders implement it with [`MemHost`].
//!
//! Pointer marshalling is the guest's job, not this crate's — everything
//! here works with slices and owned buffers.

pub mod error;
pub mod traits;
pub mod mem_store;
pub mod session;

pub use error::HostError;
pub use traits::TableHost;
pub use mem_store::MemHost;
pub use session::SessionMeta;
