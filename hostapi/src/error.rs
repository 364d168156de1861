//! Host-side error type for the external-table callbacks.

use thiserror::Error;

/// Failure of a host table callback.
///
/// Absence of a key is not an error — `table_get` models it as `Ok(None)`
/// and the proxy layer turns it into a nil read. Everything here aborts the
/// enclosing script operation instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Key contains the reserved 0x0A separator byte.
    #[error("table key contains a newline byte")]
    KeyContainsNewline,

    /// A single encoded value exceeds what fits through the boundary.
    #[error("value of {len} bytes exceeds the {max} byte limit")]
    ValueTooLarge { len: usize, max: usize },

    /// The joined key listing does not fit the caller's capacity.
    #[error("key listing overflows {cap} byte capacity")]
    KeysOverflow { cap: usize },

    /// A raw WASM import returned a negative code.
    #[error("host callback {call} returned {code}")]
    CallbackFailed { call: &'static str, code: i32 },

    /// Backend-specific failure (storage layer, I/O, corruption).
    #[error("host store failure: {0}")]
    Backend(String),
}
