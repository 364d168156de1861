//! Shared test helpers for integration tests.
//!
//! Provides session factories, compute wrappers that decode the result
//! frame, and the host-side save/restore cycle an orchestrator performs.

#![allow(dead_code)]

use luacell_hostapi::{MemHost, SessionMeta, TableHost};
use luacell_primitives::types::MAX_VALUE_LEN;
use luacell_primitives::{decode_result_frame, encode_value, WireValue};
use luacell_runtime::{ComputeError, Runtime};

/// Fresh session over an empty in-memory store.
pub fn new_session() -> Runtime<MemHost> {
    Runtime::new(MemHost::new()).expect("runtime init")
}

/// Run a script that must succeed; return `(stdout, value)`.
pub fn eval(rt: &mut Runtime<MemHost>, script: &str) -> (String, WireValue) {
    let frame = rt
        .compute(script.as_bytes())
        .unwrap_or_else(|e| panic!("compute failed: {}", e.message()));
    let (output, value) = decode_result_frame(&frame).expect("well-formed result frame");
    (String::from_utf8(output).expect("utf-8 output"), value)
}

/// Run a script that must succeed; return just the value.
pub fn eval_value(rt: &mut Runtime<MemHost>, script: &str) -> WireValue {
    eval(rt, script).1
}

/// Run a script that must fail; return the error.
pub fn eval_err(rt: &mut Runtime<MemHost>, script: &str) -> ComputeError {
    rt.compute(script.as_bytes())
        .err()
        .expect("compute unexpectedly succeeded")
}

/// Simulate an orchestrator shutdown and restart (PROTOCOL.md §8):
/// record the session metadata, boot a fresh runtime over a copy of the
/// store, sync the counter, reattach `_home`.
pub fn save_restore(rt: Runtime<MemHost>) -> Runtime<MemHost> {
    let meta = SessionMeta {
        memory_table_id: rt.memory_table_id(),
        next_table_id: rt.host().borrow().max_table_id() + 1,
    };
    let store = rt.host().borrow().clone();
    drop(rt);

    let fresh = Runtime::new(store).expect("runtime re-init");
    fresh.sync_external_table_counter(meta.next_table_id);
    fresh
        .attach_memory_table(meta.memory_table_id)
        .expect("attach restored _home");
    fresh
}

/// Host-side write of one `_io` slot, the way an orchestrator feeds input:
/// encode the value and set it straight into the backing map.
pub fn set_io_slot(rt: &Runtime<MemHost>, slot: &str, value: &WireValue) {
    let mut buf = Vec::new();
    encode_value(value, &mut buf, MAX_VALUE_LEN).expect("encodable io value");
    rt.host()
        .borrow_mut()
        .table_set(rt.io_table_id(), slot.as_bytes(), &buf)
        .expect("io slot write");
}

/// Host-side construction of a structured `_io.input`: materialize a new
/// table in the store, point the `input` slot at it, and sync the guest
/// counter past the claimed ID.
pub fn set_io_input_table(rt: &Runtime<MemHost>, entries: &[(&str, WireValue)]) {
    let host = rt.host();
    let id = {
        let mut h = host.borrow_mut();
        let id = h.reserve_id();
        for (key, value) in entries {
            let mut buf = Vec::new();
            encode_value(value, &mut buf, MAX_VALUE_LEN).expect("encodable entry");
            h.table_set(id, key.as_bytes(), &buf).expect("entry write");
        }
        id
    };
    set_io_slot(rt, "input", &WireValue::TableRef(id));
    rt.sync_external_table_counter(id + 1);
}
