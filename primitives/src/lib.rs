//! `luacell-primitives` — foundational types for the luacell runtime.
//!
//! This crate provides the value wire codec, the result frame, the builtin
//! function registry, key stringification rules, and the constants shared by
//! the Lua runtime, the WASM guest, and embedding hosts.
//!
//! Everything here is pure bytes — no Lua dependency — so the persisted-state
//! compatibility surface can be tested without a VM.
//!
//! Supports `#![no_std]` for WASM guest compatibility (use `default-features = false`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod types;
pub mod error;
pub mod wire;
pub mod registry;

// Re-export commonly used items at the crate root for convenience.
pub use types::{
    MemoryStats, EXT_ID_FIELD, HOST_MODULE, IO_BUFFER_SIZE, LUA_SIGNATURE, OUTPUT_CAPACITY,
    OUTPUT_ELLIPSIS,
};
pub use error::{CodecError, CodecResult};
pub use wire::{
    decode_result_frame, decode_value, encode_result_frame, encode_value, Tag, WireValue,
};
