//! `luacell-runtime` — an embedded Lua 5.4 session with host-backed
//! external tables.
//!
//! [`Runtime`] owns one Lua state and wires it to a [`TableHost`]: proxy
//! tables forward every key access to the host callbacks, the `compute`
//! dispatcher runs scripts and frames their results, and the well-known
//! globals `_home` and `_io` carry state across calls and sessions.
//!
//! The crate is generic over the host so the same code runs natively under
//! test (with `MemHost`) and inside the WASM guest (with the import
//! bridge). Nothing here is thread-safe — the execution model is
//! single-threaded and non-reentrant by contract.

mod bigint;
mod builtins;
mod compute;
mod globals;
mod output;
mod proxy;
mod value;

pub mod error;

pub use error::{ComputeError, RuntimeError};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use luacell_hostapi::TableHost;
use luacell_primitives::{MemoryStats, IO_BUFFER_SIZE, OUTPUT_CAPACITY};
use mlua::{Lua, LuaOptions, StdLib};

use builtins::Builtins;
use output::PrintSink;

/// State shared between the runtime handle and the Lua-side closures.
pub(crate) struct Shared<H: TableHost> {
    pub(crate) host: Rc<RefCell<H>>,
    /// Monotonic ID allocator; never decreases, never reuses.
    pub(crate) next_id: Cell<u32>,
    /// Current `_home` ID, 0 before init assigns one.
    pub(crate) memory_table_id: Cell<u32>,
    pub(crate) io_table_id: Cell<u32>,
    pub(crate) memory_alias: Cell<bool>,
}

/// One scripting session bound to a host.
pub struct Runtime<H: TableHost + 'static> {
    lua: Lua,
    shared: Rc<Shared<H>>,
    builtins: Rc<Builtins>,
    sink: PrintSink,
}

impl<H: TableHost + 'static> Runtime<H> {
    /// Create a session with its own Lua state.
    pub fn new(host: H) -> Result<Self, RuntimeError> {
        // Unsafe mode: restoring dumped closures requires loading binary
        // chunks, which safe mode refuses. Sandboxing foreign bytecode is
        // an explicit non-goal.
        let lua = unsafe { Lua::unsafe_new_with(Self::stdlibs(), LuaOptions::default()) };
        Self::with_lua(lua, host)
    }

    /// Build a session around an externally created Lua state. Used by the
    /// WASM guest, which constructs the state over its own allocator.
    pub fn with_lua(lua: Lua, host: H) -> Result<Self, RuntimeError> {
        lua.load_std_libs(Self::stdlibs())?;

        let shared = Rc::new(Shared {
            host: Rc::new(RefCell::new(host)),
            next_id: Cell::new(1),
            memory_table_id: Cell::new(0),
            io_table_id: Cell::new(0),
            memory_alias: Cell::new(false),
        });

        let sink = PrintSink::new(OUTPUT_CAPACITY);
        output::install_print(&lua, &sink)?;

        // Resolve after the print override so registry index 0 means the
        // capturing print of this session.
        let builtins = Rc::new(Builtins::resolve(&lua)?);

        proxy::install(&lua, &shared, &builtins)?;
        proxy::install_ext_module(&lua, &shared)?;
        bigint::install(&lua)?;
        globals::init(&lua, &shared)?;

        Ok(Self { lua, shared, builtins, sink })
    }

    /// Libraries available to scripts. The guest is freestanding: no `io`,
    /// no `os`, no `debug`.
    fn stdlibs() -> StdLib {
        StdLib::COROUTINE | StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH
            | StdLib::PACKAGE
    }

    /// Run one script and frame its result (PROTOCOL.md §2).
    ///
    /// Oversized input fails before the VM is touched. A failed call
    /// leaves the session usable; side effects up to the failure stand.
    pub fn compute(&mut self, script: &[u8]) -> Result<Vec<u8>, ComputeError> {
        if script.len() > IO_BUFFER_SIZE {
            return Err(ComputeError::InvalidLength { len: script.len(), max: IO_BUFFER_SIZE });
        }
        compute::run(&self.lua, &self.shared, &self.builtins, &self.sink, script)
    }

    /// Current `_home` ID.
    pub fn memory_table_id(&self) -> u32 {
        self.shared.memory_table_id.get()
    }

    /// Current `_io` ID.
    pub fn io_table_id(&self) -> u32 {
        self.shared.io_table_id.get()
    }

    /// Rebind `_home` to a persisted ID. Sync the counter first
    /// (PROTOCOL.md §8).
    pub fn attach_memory_table(&self, id: u32) -> Result<(), RuntimeError> {
        globals::attach_memory(&self.lua, &self.shared, id)
    }

    /// Raise the ID allocator to at least `next_id`. Never lowers it.
    pub fn sync_external_table_counter(&self, next_id: u32) {
        if next_id > self.shared.next_id.get() {
            self.shared.next_id.set(next_id);
        }
    }

    /// Delete `input`, `output` and `meta` from the `_io` map.
    pub fn clear_io_table(&self) -> Result<(), RuntimeError> {
        globals::clear_io(&self.shared)
    }

    /// Toggle the legacy `Memory` alias for `_home`.
    pub fn set_memory_alias_enabled(&self, enabled: bool) -> Result<(), RuntimeError> {
        globals::set_memory_alias(&self.lua, &self.shared, enabled)
    }

    /// Run a full garbage collection cycle.
    pub fn run_gc(&self) -> Result<(), RuntimeError> {
        self.lua.gc_collect()?;
        Ok(())
    }

    /// Fill the memory statistics struct. The allocator region fields are
    /// zero here; the WASM guest overlays its own numbers.
    pub fn memory_stats(&self) -> MemoryStats {
        MemoryStats {
            lua_heap_bytes: self.lua.used_memory() as u32,
            region_used_bytes: 0,
            region_capacity_bytes: 0,
            io_buffer_bytes: IO_BUFFER_SIZE as u32,
        }
    }

    /// Handle on the host, shared with the proxy closures. Lets embedders
    /// and tests reach the backing store between compute calls.
    pub fn host(&self) -> Rc<RefCell<H>> {
        Rc::clone(&self.shared.host)
    }
}
