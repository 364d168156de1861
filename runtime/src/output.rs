//! Print capture sink.
//!
//! `compute` replaces the global `print` with a function that writes into a
//! bounded byte buffer instead of any stdout (there is none in the guest).
//! The sink lives for the whole session; the dispatcher clears it at the
//! start of each call and drains it at the end.

use std::cell::RefCell;
use std::rc::Rc;

use luacell_primitives::OUTPUT_ELLIPSIS;
use mlua::{Lua, MultiValue};

struct SinkInner {
    buf: Vec<u8>,
    cap: usize,
    truncated: bool,
}

/// Shared, bounded capture buffer. Cheap to clone.
#[derive(Clone)]
pub(crate) struct PrintSink {
    inner: Rc<RefCell<SinkInner>>,
}

impl PrintSink {
    /// `cap` must leave room for the truncation marker.
    pub fn new(cap: usize) -> Self {
        debug_assert!(cap >= OUTPUT_ELLIPSIS.len());
        Self {
            inner: Rc::new(RefCell::new(SinkInner { buf: Vec::new(), cap, truncated: false })),
        }
    }

    /// Append bytes. Once full, a `...` marker is appended and all further
    /// writes are dropped until the next `clear`.
    pub fn write(&self, data: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        if inner.truncated {
            return;
        }
        if inner.buf.len() + data.len() <= inner.cap {
            inner.buf.extend_from_slice(data);
            return;
        }
        let cut = inner.cap - OUTPUT_ELLIPSIS.len();
        if inner.buf.len() > cut {
            inner.buf.truncate(cut);
        } else {
            let take = cut - inner.buf.len();
            inner.buf.extend_from_slice(&data[..take]);
        }
        inner.buf.extend_from_slice(OUTPUT_ELLIPSIS);
        inner.truncated = true;
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.buf.clear();
        inner.truncated = false;
    }

    /// Drain the captured bytes, leaving the sink empty.
    pub fn take(&self) -> Vec<u8> {
        let mut inner = self.inner.borrow_mut();
        inner.truncated = false;
        std::mem::take(&mut inner.buf)
    }
}

/// Replace the global `print` with one that writes into `sink`.
///
/// Formatting matches stock `print`: `tostring` of each argument (so
/// `__tostring` metamethods are honored), tab-separated, newline-terminated.
pub(crate) fn install_print(lua: &Lua, sink: &PrintSink) -> mlua::Result<()> {
    let sink = sink.clone();
    let print = lua.create_function(move |_, args: MultiValue| {
        let mut line = Vec::new();
        for (i, value) in args.into_iter().enumerate() {
            if i > 0 {
                line.push(b'\t');
            }
            line.extend_from_slice(value.to_string()?.as_bytes());
        }
        line.push(b'\n');
        sink.write(&line);
        Ok(())
    })?;
    lua.globals().set("print", print)
}
