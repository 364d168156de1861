//! Session lifecycle integration tests: `_home` persistence, counter
//! synchronization, `_io` handling, and function round-trips across a
//! save/restore boundary.

mod common;

use common::*;
use luacell_primitives::WireValue;

// ── `_home` across restarts ──

#[test]
fn test_counter_survives_save_restore() {
    let mut rt = new_session();
    let script = "_home.counter = (_home.counter or 0) + 1; return _home.counter";

    assert_eq!(eval_value(&mut rt, script), WireValue::Integer(1));
    assert_eq!(eval_value(&mut rt, script), WireValue::Integer(2));

    let mut rt = save_restore(rt);
    assert_eq!(eval_value(&mut rt, script), WireValue::Integer(3));
}

#[test]
fn test_home_keys_and_values_survive() {
    let mut rt = new_session();
    eval(
        &mut rt,
        "_home.name = 'alice'\n\
         _home.age = 30\n\
         _home.pi = 3.25\n\
         _home.flag = true",
    );
    let before = rt.memory_table_id();

    let mut rt = save_restore(rt);
    assert_eq!(rt.memory_table_id(), before);
    assert_eq!(
        eval_value(&mut rt, "return _home.name"),
        WireValue::Str(b"alice".to_vec())
    );
    assert_eq!(eval_value(&mut rt, "return _home.age"), WireValue::Integer(30));
    assert_eq!(eval_value(&mut rt, "return _home.pi"), WireValue::Float(3.25));
    assert_eq!(eval_value(&mut rt, "return _home.flag"), WireValue::Boolean(true));
    assert_eq!(
        eval_value(&mut rt, "return ext.keys(_home)"),
        WireValue::Str(b"age\nflag\nname\npi".to_vec())
    );
}

#[test]
fn test_detach_reattach_within_session() {
    let mut rt = new_session();
    let value = eval_value(
        &mut rt,
        "local t = ext.new_table()\n\
         local id = t.__ext_table_id\n\
         t.payload = 'kept'\n\
         t = nil\n\
         collectgarbage()\n\
         local again = ext.attach(id)\n\
         return again.payload",
    );
    assert_eq!(value, WireValue::Str(b"kept".to_vec()));
}

#[test]
fn test_nested_tables_survive_restore() {
    let mut rt = new_session();
    eval(&mut rt, "_home.cfg = { service = { port = 8080 } }");

    let mut rt = save_restore(rt);
    assert_eq!(
        eval_value(&mut rt, "return _home.cfg.service.port"),
        WireValue::Integer(8080)
    );
}

// ── Counter discipline ──

#[test]
fn test_ids_are_strictly_increasing() {
    let mut rt = new_session();
    let value = eval_value(
        &mut rt,
        "local a = ext.new_table()\n\
         local b = ext.new_table()\n\
         return b.__ext_table_id - a.__ext_table_id",
    );
    assert_eq!(value, WireValue::Integer(1));
}

#[test]
fn test_sync_raises_but_never_lowers() {
    let mut rt = new_session();
    rt.sync_external_table_counter(100);
    assert_eq!(
        eval_value(&mut rt, "return ext.new_table().__ext_table_id"),
        WireValue::Integer(100)
    );

    // A stale, smaller sync must not roll the allocator back.
    rt.sync_external_table_counter(5);
    assert_eq!(
        eval_value(&mut rt, "return ext.new_table().__ext_table_id"),
        WireValue::Integer(101)
    );
}

#[test]
fn test_fresh_allocations_do_not_collide_after_restore() {
    let mut rt = new_session();
    eval(&mut rt, "_home.t = { marker = 'restored data' }");

    let mut rt = save_restore(rt);
    // A fresh table after restore must get an ID past everything stored.
    let value = eval_value(
        &mut rt,
        "local fresh = ext.new_table()\n\
         fresh.marker = 'fresh data'\n\
         return _home.t.marker",
    );
    assert_eq!(value, WireValue::Str(b"restored data".to_vec()));
}

// ── Functions across the boundary ──

#[test]
fn test_closure_roundtrip_same_session() {
    let mut rt = new_session();
    eval(&mut rt, "_home.double = function(x) return x * 2 end");
    assert_eq!(
        eval_value(&mut rt, "return _home.double(5)"),
        WireValue::Integer(10)
    );
}

#[test]
fn test_closure_roundtrip_across_restore() {
    let mut rt = new_session();
    eval(&mut rt, "_home.square = function(x) return x * x end");

    let mut rt = save_restore(rt);
    assert_eq!(
        eval_value(&mut rt, "return _home.square(7)"),
        WireValue::Integer(49)
    );
}

#[test]
fn test_restored_closure_can_use_globals() {
    let mut rt = new_session();
    eval(&mut rt, "_home.shout = function(s) return string.upper(s) end");

    let mut rt = save_restore(rt);
    assert_eq!(
        eval_value(&mut rt, "return _home.shout('loud')"),
        WireValue::Str(b"LOUD".to_vec())
    );
}

#[test]
fn test_builtin_reference_survives_restore() {
    let mut rt = new_session();
    eval(&mut rt, "_home.fmt = string.format");

    let mut rt = save_restore(rt);
    assert_eq!(
        eval_value(&mut rt, "return _home.fmt('%03d', 7)"),
        WireValue::Str(b"007".to_vec())
    );
}

#[test]
fn test_captured_upvalues_do_not_survive() {
    let mut rt = new_session();
    // The dump carries structure, not captured state: on load the first
    // upvalue is bound to the globals table and the rest to nil.
    eval(
        &mut rt,
        "local a, b = 7, 9\n\
         _home.pair = function() return a, b end",
    );
    let value = eval_value(
        &mut rt,
        "local x, y = _home.pair()\n\
         return tostring(x == 7) .. ':' .. tostring(y)",
    );
    assert_eq!(value, WireValue::Str(b"false:nil".to_vec()));

    // Still loads and runs after a full restore.
    let mut rt = save_restore(rt);
    let value = eval_value(
        &mut rt,
        "local x, y = _home.pair()\n\
         return tostring(x == 7) .. ':' .. tostring(y)",
    );
    assert_eq!(value, WireValue::Str(b"false:nil".to_vec()));
}

// ── `_io` lifecycle ──

#[test]
fn test_io_input_scenario() {
    let mut rt = new_session();
    set_io_input_table(
        &rt,
        &[
            ("name", WireValue::Str(b"Alice".to_vec())),
            ("age", WireValue::Integer(30)),
        ],
    );
    let value = eval_value(&mut rt, "return _io.input.name .. ' is ' .. _io.input.age");
    assert_eq!(value, WireValue::Str(b"Alice is 30".to_vec()));
}

#[test]
fn test_io_scalar_input() {
    let mut rt = new_session();
    set_io_slot(&rt, "input", &WireValue::Str(b"ping".to_vec()));
    assert_eq!(
        eval_value(&mut rt, "return _io.input .. '/pong'"),
        WireValue::Str(b"ping/pong".to_vec())
    );
}

#[test]
fn test_io_output_readable_by_host() {
    let mut rt = new_session();
    eval(&mut rt, "_io.output = 'result-bytes'");

    let host = rt.host();
    let host = host.borrow();
    let stored = host.table(rt.io_table_id()).unwrap().get(&b"output"[..]).unwrap();
    let (value, _) = luacell_primitives::decode_value(stored).unwrap();
    assert_eq!(value, WireValue::Str(b"result-bytes".to_vec()));
}

#[test]
fn test_io_slots_persist_until_cleared() {
    let mut rt = new_session();
    eval(&mut rt, "_io.output = 'sticky'");
    // Not auto-cleared by the next compute.
    assert_eq!(
        eval_value(&mut rt, "return _io.output"),
        WireValue::Str(b"sticky".to_vec())
    );

    rt.clear_io_table().unwrap();
    assert_eq!(
        eval_value(
            &mut rt,
            "return _io.input == nil and _io.output == nil and _io.meta == nil"
        ),
        WireValue::Boolean(true)
    );
    // The proxy itself survived the clear.
    assert_eq!(eval_value(&mut rt, "_io.meta = 'again'; return _io.meta"),
        WireValue::Str(b"again".to_vec()));
}

// ── Aliasing and maintenance exports ──

#[test]
fn test_memory_alias_toggle() {
    let mut rt = new_session();
    assert_eq!(eval_value(&mut rt, "return Memory == nil"), WireValue::Boolean(true));

    rt.set_memory_alias_enabled(true).unwrap();
    assert_eq!(
        eval_value(&mut rt, "return rawequal(Memory, _home)"),
        WireValue::Boolean(true)
    );

    rt.set_memory_alias_enabled(false).unwrap();
    assert_eq!(eval_value(&mut rt, "return Memory == nil"), WireValue::Boolean(true));
}

#[test]
fn test_memory_alias_follows_reattach() {
    let mut rt = new_session();
    rt.set_memory_alias_enabled(true).unwrap();
    eval(&mut rt, "_home.tag = 'first'");
    let home = rt.memory_table_id();

    let mut rt2 = save_restore(rt);
    rt2.set_memory_alias_enabled(true).unwrap();
    rt2.attach_memory_table(home).unwrap();
    assert_eq!(
        eval_value(&mut rt2, "return Memory.tag"),
        WireValue::Str(b"first".to_vec())
    );
}

#[test]
fn test_gc_and_memory_stats() {
    let mut rt = new_session();
    eval(&mut rt, "local t = {} for i = 1, 1000 do t[i] = ('x'):rep(100) end");
    rt.run_gc().unwrap();
    let stats = rt.memory_stats();
    assert!(stats.lua_heap_bytes > 0);
    assert_eq!(stats.io_buffer_bytes, 65_536);
}
