//! The compute dispatcher (PROTOCOL.md §2, §3).
//!
//! One call: load the script, run it, capture what it printed, lower the
//! last result value, and frame everything for the I/O buffer. Load and
//! execution failures are kept apart because the host surfaces them with
//! different tags.
//!
//! VM state survives across calls — globals, loaded modules, and whatever
//! the script pushed into `_home` through the proxies. A failed call leaves
//! the VM valid; side effects up to the failure point stand.

use std::rc::Rc;

use luacell_hostapi::TableHost;
use luacell_primitives::{encode_result_frame, IO_BUFFER_SIZE};
use mlua::{Lua, MultiValue, Value};

use crate::builtins::Builtins;
use crate::error::ComputeError;
use crate::output::PrintSink;
use crate::value;
use crate::Shared;

pub(crate) fn run<H: TableHost>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    builtins: &Builtins,
    sink: &PrintSink,
    script: &[u8],
) -> Result<Vec<u8>, ComputeError> {
    sink.clear();

    let func = lua
        .load(script)
        .set_name("=compute")
        .into_function()
        .map_err(load_error)?;

    let results = func.call::<MultiValue>(()).map_err(exec_error)?;

    // Multi-return scripts report their last value, matching REPL behavior.
    let last = results.into_iter().last().unwrap_or(Value::Nil);
    let wire = value::lower(lua, shared, builtins, &last)
        .map_err(|e| ComputeError::Runtime(root_message(&e)))?;

    let output = sink.take();
    encode_result_frame(&output, &wire, IO_BUFFER_SIZE)
        .map_err(|e| ComputeError::Runtime(e.to_string()))
}

fn load_error(err: mlua::Error) -> ComputeError {
    match err {
        mlua::Error::SyntaxError { message, .. } => ComputeError::Compile(message),
        mlua::Error::MemoryError(msg) => ComputeError::Runtime(msg),
        other => ComputeError::Compile(other.to_string()),
    }
}

fn exec_error(err: mlua::Error) -> ComputeError {
    ComputeError::Runtime(root_message(&err))
}

/// Unwrap callback nesting so the host sees the original failure, not the
/// layers it bubbled through.
fn root_message(err: &mlua::Error) -> String {
    match err {
        mlua::Error::CallbackError { cause, .. } => root_message(cause),
        mlua::Error::RuntimeError(msg) => msg.clone(),
        other => other.to_string(),
    }
}
