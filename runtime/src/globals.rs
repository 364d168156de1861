//! The well-known globals `_home` and `_io`.
//!
//! `_io` is created first at init and lives for the whole process; its
//! sub-slots (`input`, `output`, `meta`) are cleared, never the table.
//! `_home` is created fresh unless the host reattaches a persisted ID via
//! `attach_memory_table`, and can optionally be aliased as `Memory` for
//! older scripts.

use std::rc::Rc;

use luacell_hostapi::TableHost;
use mlua::{Lua, Table, Value};

use crate::error::RuntimeError;
use crate::proxy;
use crate::Shared;

/// Slots the host and scripts share through `_io`.
const IO_SLOTS: [&[u8]; 3] = [b"input", b"output", b"meta"];

/// Create `_io` and `_home` on a fresh session.
pub(crate) fn init<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
) -> Result<(), RuntimeError> {
    let io = proxy::new_table(lua, shared)?;
    shared.io_table_id.set(proxy::proxy_id(&io)?);
    lua.globals().set("_io", io)?;

    let home = proxy::new_table(lua, shared)?;
    shared.memory_table_id.set(proxy::proxy_id(&home)?);
    set_home(lua, shared, home)?;
    Ok(())
}

/// Rebind `_home` to an existing external table ID.
///
/// The host must have advanced the ID counter first, or later allocations
/// will alias restored tables.
pub(crate) fn attach_memory<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    id: u32,
) -> Result<(), RuntimeError> {
    let home = proxy::attach(lua, id)?;
    shared.memory_table_id.set(id);
    set_home(lua, shared, home)
}

/// Toggle the legacy `Memory` alias for `_home`.
pub(crate) fn set_memory_alias<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    enabled: bool,
) -> Result<(), RuntimeError> {
    shared.memory_alias.set(enabled);
    if enabled {
        let home: Value = lua.globals().get("_home")?;
        lua.globals().set("Memory", home)?;
    } else {
        lua.globals().set("Memory", Value::Nil)?;
    }
    Ok(())
}

/// Delete the three `_io` sub-slots from the backing map. The proxy and
/// its ID survive.
pub(crate) fn clear_io<H: TableHost>(shared: &Shared<H>) -> Result<(), RuntimeError> {
    let id = shared.io_table_id.get();
    let mut host = shared.host.borrow_mut();
    for slot in IO_SLOTS {
        host.table_delete(id, slot)?;
    }
    Ok(())
}

fn set_home<H: TableHost + 'static>(
    lua: &Lua,
    shared: &Rc<Shared<H>>,
    home: Table,
) -> Result<(), RuntimeError> {
    if shared.memory_alias.get() {
        lua.globals().set("Memory", &home)?;
    }
    lua.globals().set("_home", home)?;
    Ok(())
}
