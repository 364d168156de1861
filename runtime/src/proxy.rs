//! External-table proxies.
//!
//! A proxy is a plain Lua table carrying one raw field, `__ext_table_id`,
//! and a shared metatable whose `__index`, `__newindex` and `__len` forward
//! every key access to the host callbacks. Because the ID field is set
//! raw, reads and writes of that one key bypass the metamethods entirely;
//! every other key misses the (otherwise empty) table and lands in the
//! host round-trip.
//!
//! The metatable is created once at init, parked in the named registry,
//! and shared by every proxy. It is never mutated afterwards.

use std::rc::Rc;

use luacell_hostapi::TableHost;
use luacell_primitives::types::{integer_key, key_has_newline};
use luacell_primitives::{decode_value, encode_value, types::MAX_VALUE_LEN, EXT_ID_FIELD};
use mlua::{Error, Lua, Table, Value};

use crate::builtins::Builtins;
use crate::value;
use crate::Shared;

const PROXY_MT_KEY: &str = "luacell.proxy_mt";

/// Create the shared proxy metatable and park it in the Lua registry.
pub(crate) fn install<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    builtins: &Rc<Builtins>,
) -> mlua::Result<()> {
    let mt = lua.create_table()?;

    let index = {
        let shared = Rc::clone(shared);
        let builtins = Rc::clone(builtins);
        lua.create_function(move |lua, (table, key): (Table, Value)| {
            let id = proxy_id(&table)?;
            let key = stringify_key(&key)?;
            let fetched = shared
                .host
                .borrow_mut()
                .table_get(id, &key)
                .map_err(Error::external)?;
            match fetched {
                // Absent key reads as nil; the proxy never retries.
                None => Ok(Value::Nil),
                Some(bytes) => {
                    let (wire, _) = decode_value(&bytes).map_err(Error::external)?;
                    value::raise(lua, &builtins, wire)
                }
            }
        })?
    };
    mt.set("__index", index)?;

    let newindex = {
        let shared = Rc::clone(shared);
        let builtins = Rc::clone(builtins);
        lua.create_function(move |lua, (table, key, val): (Table, Value, Value)| {
            if is_id_field(&key) {
                return Err(Error::RuntimeError(format!(
                    "cannot assign {} through an external table",
                    EXT_ID_FIELD
                )));
            }
            let id = proxy_id(&table)?;
            let key = stringify_key(&key)?;
            match val {
                Value::Nil => shared
                    .host
                    .borrow_mut()
                    .table_delete(id, &key)
                    .map_err(Error::external)?,
                val => {
                    let wire = value::lower(lua, &shared, &builtins, &val)?;
                    let mut buf = Vec::new();
                    encode_value(&wire, &mut buf, MAX_VALUE_LEN).map_err(Error::external)?;
                    shared
                        .host
                        .borrow_mut()
                        .table_set(id, &key, &buf)
                        .map_err(Error::external)?;
                }
            }
            Ok(())
        })?
    };
    mt.set("__newindex", newindex)?;

    let len = {
        let shared = Rc::clone(shared);
        lua.create_function(move |_, table: Table| {
            let id = proxy_id(&table)?;
            let size = shared
                .host
                .borrow_mut()
                .table_size(id)
                .map_err(Error::external)?;
            Ok(i64::from(size))
        })?
    };
    mt.set("__len", len)?;

    // Lock the metatable against getmetatable/setmetatable.
    mt.set("__metatable", "external table")?;

    lua.set_named_registry_value(PROXY_MT_KEY, mt)
}

/// Take the next ID from the monotonic allocator.
pub(crate) fn alloc_id<H: TableHost>(shared: &Shared<H>) -> mlua::Result<u32> {
    let id = shared.next_id.get();
    let next = id
        .checked_add(1)
        .ok_or_else(|| Error::RuntimeError("external table IDs exhausted".into()))?;
    shared.next_id.set(next);
    Ok(id)
}

/// Build a proxy bound to an existing ID. The host map is not touched.
pub(crate) fn attach(lua: &Lua, id: u32) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.raw_set(EXT_ID_FIELD, id)?;
    let mt: Table = lua.named_registry_value(PROXY_MT_KEY)?;
    table.set_metatable(Some(mt));
    Ok(table)
}

/// Allocate a fresh ID and return its proxy. The host materializes the
/// backing map on first touch.
pub(crate) fn new_table<H: TableHost>(lua: &Lua, shared: &Shared<H>) -> mlua::Result<Table> {
    attach(lua, alloc_id(shared)?)
}

/// The external table ID recorded on a proxy.
pub(crate) fn proxy_id(table: &Table) -> mlua::Result<u32> {
    try_proxy_id(table)?
        .ok_or_else(|| Error::RuntimeError("not an external table".into()))
}

/// Like [`proxy_id`] but `None` for plain tables.
pub(crate) fn try_proxy_id(table: &Table) -> mlua::Result<Option<u32>> {
    table.raw_get(EXT_ID_FIELD)
}

/// Install the `ext` module: exposed as a global and registered under
/// `package.loaded` so `require("ext")` resolves it too.
pub(crate) fn install_ext_module<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
) -> mlua::Result<()> {
    let exports = lua.create_table()?;

    let new_table_fn = {
        let shared = Rc::clone(shared);
        lua.create_function(move |lua, ()| new_table(lua, &shared))?
    };
    exports.set("new_table", new_table_fn)?;

    exports.set(
        "attach",
        lua.create_function(|lua, id: u32| attach(lua, id))?,
    )?;

    let keys_fn = {
        let shared = Rc::clone(shared);
        lua.create_function(move |lua, table: Table| {
            let id = proxy_id(&table)?;
            let keys = shared
                .host
                .borrow_mut()
                .table_keys(id)
                .map_err(Error::external)?;
            lua.create_string(&keys)
        })?
    };
    exports.set("keys", keys_fn)?;

    let now_fn = {
        let shared = Rc::clone(shared);
        lua.create_function(move |_, ()| Ok(shared.host.borrow_mut().now_millis()))?
    };
    exports.set("now", now_fn)?;

    let loaded: Table = lua.globals().get::<Table>("package")?.get("loaded")?;
    loaded.set("ext", &exports)?;
    lua.globals().set("ext", exports)
}

/// Stringify a proxy key: integers use Lua's decimal rendering, strings
/// pass through raw. Floats and everything else are refused.
fn stringify_key(key: &Value) -> mlua::Result<Vec<u8>> {
    match key {
        Value::Integer(n) => Ok(integer_key(*n).into_bytes()),
        Value::String(s) => {
            let bytes = s.as_bytes().to_vec();
            if key_has_newline(&bytes) {
                return Err(Error::RuntimeError(
                    "external table keys must not contain newlines".into(),
                ));
            }
            Ok(bytes)
        }
        Value::Number(_) => Err(Error::RuntimeError(
            "float keys are not permitted in external tables".into(),
        )),
        other => Err(Error::RuntimeError(format!(
            "{} keys are not permitted in external tables",
            other.type_name()
        ))),
    }
}

fn is_id_field(key: &Value) -> bool {
    matches!(key, Value::String(s) if &*s.as_bytes() == EXT_ID_FIELD.as_bytes())
}
