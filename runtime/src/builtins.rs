//! Builtin registry resolution (PROTOCOL.md §7).
//!
//! The registry itself is the static name list in `luacell-primitives`.
//! This module binds it to a live Lua state: each canonical name is looked
//! up once at init, producing a pointer → index map for the encode path and
//! an index → function table for the decode path.
//!
//! Resolution runs after the print override is installed, so index 0
//! (`print`) refers to the capturing print of this session.

use std::collections::HashMap;
use std::ffi::c_void;

use luacell_primitives::registry;
use mlua::{Function, Lua, Table};

pub(crate) struct Builtins {
    funcs: Vec<Option<Function>>,
    by_ptr: HashMap<*const c_void, u16>,
}

impl Builtins {
    /// Resolve every registry name against the current globals.
    ///
    /// Names that resolve to nothing (a library not opened in this build)
    /// keep their slot but encode/decode as absent.
    pub fn resolve(lua: &Lua) -> mlua::Result<Self> {
        let globals = lua.globals();
        let mut funcs = Vec::with_capacity(registry::BUILTINS.len());
        let mut by_ptr = HashMap::new();

        for (index, name) in registry::BUILTINS.iter().enumerate() {
            let func = lookup_path(&globals, name)?;
            if let Some(ref f) = func {
                by_ptr.insert(f.to_pointer(), index as u16);
            }
            funcs.push(func);
        }
        Ok(Self { funcs, by_ptr })
    }

    /// Registry index of the function at `ptr`, if it is a builtin.
    pub fn index_of_ptr(&self, ptr: *const c_void) -> Option<u16> {
        self.by_ptr.get(&ptr).copied()
    }

    /// The function registered at `index`.
    pub fn function_at(&self, index: u16) -> Option<Function> {
        self.funcs.get(index as usize)?.clone()
    }
}

/// Walk a dotted registry name through the globals table.
fn lookup_path(globals: &Table, path: &str) -> mlua::Result<Option<Function>> {
    match path.split_once('.') {
        None => globals.get::<Option<Function>>(path),
        Some((module, leaf)) => match globals.get::<Option<Table>>(module)? {
            Some(module) => module.get::<Option<Function>>(leaf),
            None => Ok(None),
        },
    }
}
