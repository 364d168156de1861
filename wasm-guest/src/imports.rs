//! Host function imports (PROTOCOL.md §4).
//!
//! All host functions live under the `luacell_host` WASM module. Every
//! table callback returns `i32`; negative means error, and for
//! `ext_table_get` also "no such key".

#[link(wasm_import_module = "luacell_host")]
extern "C" {
    /// Upsert one key in table `id`.
    pub fn ext_table_set(id: u32, k_ptr: i32, k_len: i32, v_ptr: i32, v_len: i32) -> i32;

    /// Read one key into `out_ptr`. Returns bytes written, or negative
    /// when the key is absent.
    pub fn ext_table_get(id: u32, k_ptr: i32, k_len: i32, out_ptr: i32, out_cap: i32) -> i32;

    /// Delete one key. Idempotent.
    pub fn ext_table_delete(id: u32, k_ptr: i32, k_len: i32) -> i32;

    /// Entry count; unknown tables report 0.
    pub fn ext_table_size(id: u32) -> i32;

    /// Newline-joined key list into `out_ptr`, or negative on overflow.
    pub fn ext_table_keys(id: u32, out_ptr: i32, out_cap: i32) -> i32;

    /// Milliseconds from the host clock.
    pub fn time_now() -> i64;
}
