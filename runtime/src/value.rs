//! Lowering Lua values to the wire and raising them back.
//!
//! The byte layer lives in `luacell-primitives`; this module handles the
//! Lua-specific half: proxy detection, plain-table promotion, closure
//! dumping, and builtin pointer matching.
//!
//! Promotion policy: a plain table at a top-level encode becomes a fresh
//! external table. String and integer keys copy over (values lowered
//! recursively, so nested plain tables promote too); any other key type,
//! and any cycle, refuses the whole encode.

use std::ffi::c_void;
use std::rc::Rc;

use luacell_hostapi::TableHost;
use luacell_primitives::types::{integer_key, key_has_newline, MAX_VALUE_LEN};
use luacell_primitives::{encode_value, CodecError, WireValue, LUA_SIGNATURE};
use mlua::{ChunkMode, Error, Function, Lua, Table, Value};

use crate::builtins::Builtins;
use crate::proxy;
use crate::Shared;

/// Lower one Lua value into its wire form.
pub(crate) fn lower<H: TableHost>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    builtins: &Builtins,
    value: &Value,
) -> mlua::Result<WireValue> {
    let mut promoting = Vec::new();
    lower_inner(lua, shared, builtins, value, &mut promoting)
}

fn lower_inner<H: TableHost>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    builtins: &Builtins,
    value: &Value,
    promoting: &mut Vec<*const c_void>,
) -> mlua::Result<WireValue> {
    match value {
        Value::Nil => Ok(WireValue::Nil),
        Value::Boolean(b) => Ok(WireValue::Boolean(*b)),
        Value::Integer(n) => Ok(WireValue::Integer(*n)),
        Value::Number(x) => Ok(WireValue::Float(*x)),
        Value::String(s) => Ok(WireValue::Str(s.as_bytes().to_vec())),
        Value::Table(t) => match proxy::try_proxy_id(t)? {
            // A proxy crosses as its ID — identity, never contents.
            Some(id) => Ok(WireValue::TableRef(id)),
            None => promote(lua, shared, builtins, t, promoting),
        },
        Value::Function(f) => lower_function(builtins, f),
        other => Err(unsupported(format!(
            "{} values cannot cross the boundary",
            other.type_name()
        ))),
    }
}

fn lower_function(builtins: &Builtins, func: &Function) -> mlua::Result<WireValue> {
    if let Some(index) = builtins.index_of_ptr(func.to_pointer()) {
        return Ok(WireValue::BuiltinRef(index));
    }
    let info = func.info();
    if info.what == "C" {
        let name = info.name.unwrap_or_else(|| "?".into());
        return Err(unsupported(format!(
            "C function '{}' is not in the builtin registry",
            name
        )));
    }
    // Portable dump, debug info stripped. Upvalues are not captured.
    let dump = func.dump(true);
    if dump.len() < LUA_SIGNATURE.len() || dump[..4] != LUA_SIGNATURE {
        return Err(unsupported("function cannot be dumped".into()));
    }
    Ok(WireValue::FunctionDump(dump))
}

/// Promote a plain table into a fresh external table and emit its ref.
fn promote<H: TableHost>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    builtins: &Builtins,
    table: &Table,
    promoting: &mut Vec<*const c_void>,
) -> mlua::Result<WireValue> {
    let ptr = table.to_pointer();
    if promoting.contains(&ptr) {
        return Err(unsupported("cyclic tables cannot be promoted".into()));
    }
    promoting.push(ptr);

    let id = proxy::alloc_id(shared)?;
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, val) = pair?;
        let key = match key {
            Value::Integer(n) => integer_key(n).into_bytes(),
            Value::String(s) => {
                let bytes = s.as_bytes().to_vec();
                if key_has_newline(&bytes) {
                    return Err(unsupported(
                        "table key contains a newline byte".into(),
                    ));
                }
                bytes
            }
            other => {
                return Err(unsupported(format!(
                    "table with {} key cannot be promoted",
                    other.type_name()
                )))
            }
        };
        let wire = lower_inner(lua, shared, builtins, &val, promoting)?;
        let mut buf = Vec::new();
        encode_value(&wire, &mut buf, MAX_VALUE_LEN).map_err(Error::external)?;
        shared
            .host
            .borrow_mut()
            .table_set(id, &key, &buf)
            .map_err(Error::external)?;
    }

    promoting.pop();
    Ok(WireValue::TableRef(id))
}

/// Raise a wire value back into the VM.
pub(crate) fn raise(lua: &Lua, builtins: &Builtins, wire: WireValue) -> mlua::Result<Value> {
    match wire {
        WireValue::Nil => Ok(Value::Nil),
        WireValue::Boolean(b) => Ok(Value::Boolean(b)),
        WireValue::Integer(n) => Ok(Value::Integer(n)),
        WireValue::Float(x) => Ok(Value::Number(x)),
        WireValue::Str(bytes) => Ok(Value::String(lua.create_string(&bytes)?)),
        WireValue::TableRef(id) => Ok(Value::Table(proxy::attach(lua, id)?)),
        WireValue::FunctionDump(dump) => {
            // The signature was checked at decode; load binary-only so a
            // source chunk smuggled into a dump slot is rejected.
            let func = lua
                .load(&dump[..])
                .set_name("=dump")
                .set_mode(ChunkMode::Binary)
                .into_function()
                .map_err(|e| {
                    Error::external(CodecError::Malformed(format!(
                        "bytecode load failed: {}",
                        e
                    )))
                })?;
            Ok(Value::Function(func))
        }
        WireValue::BuiltinRef(index) => builtins
            .function_at(index)
            .map(Value::Function)
            .ok_or_else(|| {
                Error::external(CodecError::Malformed(format!(
                    "builtin index {} is out of range",
                    index
                )))
            }),
    }
}

fn unsupported(msg: String) -> Error {
    Error::external(CodecError::Unsupported(msg))
}
