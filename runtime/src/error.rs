//! Error types for the runtime crate.

use luacell_hostapi::HostError;
use luacell_primitives::CodecError;
use thiserror::Error;

/// Failure of a `compute` call (PROTOCOL.md §2).
///
/// The `Display` form is exactly the tagged message written into the I/O
/// buffer: `compile: …`, `runtime: …` or `internal: …`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    /// The script failed to load.
    #[error("compile: {0}")]
    Compile(String),

    /// The script loaded but raised during execution. Serialization
    /// failures of the return value land here too — they surface as
    /// VM-level errors.
    #[error("runtime: {0}")]
    Runtime(String),

    /// The runtime itself misbehaved.
    #[error("internal: {0}")]
    Internal(String),

    /// Script length exceeds the I/O buffer; the VM was never touched.
    #[error("internal: script length {len} exceeds the {max} byte I/O buffer")]
    InvalidLength { len: usize, max: usize },
}

impl ComputeError {
    /// The UTF-8 message the host reads out of the buffer.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Error type for the non-compute runtime operations (init, attach,
/// clear, GC).
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Lua(#[from] mlua::Error),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
