//! The `bigint` script module.
//!
//! Arbitrary-precision integers backed by `num_bigint::BigInt`, wrapped as
//! userdata with the full operator metatable. Registered under
//! `package.loaded` so `require("bigint")` resolves without a searcher.
//!
//! Bigints do not cross the host boundary — they are a script-side
//! convenience, and encoding one fails like any other userdata.

use mlua::{Error, Lua, MetaMethod, Table, UserData, UserDataMethods, Value};
use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BigIntVal(BigInt);

/// Accept a bigint, an integer, or a decimal string.
fn coerce(value: &Value) -> mlua::Result<BigInt> {
    match value {
        Value::Integer(n) => Ok(BigInt::from(*n)),
        Value::String(s) => {
            let text = s.to_str()?;
            text.trim()
                .parse::<BigInt>()
                .map_err(|e| Error::RuntimeError(format!("not a bigint: {}", e)))
        }
        Value::UserData(ud) => Ok(ud.borrow::<BigIntVal>()?.0.clone()),
        other => Err(Error::RuntimeError(format!(
            "cannot convert {} to bigint",
            other.type_name()
        ))),
    }
}

/// Floor division, matching Lua's `//` on integers.
fn floor_div(a: &BigInt, b: &BigInt) -> mlua::Result<(BigInt, BigInt)> {
    use num_bigint::Sign;
    if b.sign() == Sign::NoSign {
        return Err(Error::RuntimeError("attempt to divide by zero".into()));
    }
    let q = a / b;
    let r = a - &q * b;
    if r.sign() != Sign::NoSign && r.sign() != b.sign() {
        Ok((q - 1, r + b))
    } else {
        Ok((q, r))
    }
}

impl UserData for BigIntVal {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // Arithmetic goes through meta functions, not methods, so mixed
        // operand orders (5 + big as well as big + 5) both dispatch here.
        methods.add_meta_function(MetaMethod::Add, |_, (a, b): (Value, Value)| {
            Ok(BigIntVal(coerce(&a)? + coerce(&b)?))
        });
        methods.add_meta_function(MetaMethod::Sub, |_, (a, b): (Value, Value)| {
            Ok(BigIntVal(coerce(&a)? - coerce(&b)?))
        });
        methods.add_meta_function(MetaMethod::Mul, |_, (a, b): (Value, Value)| {
            Ok(BigIntVal(coerce(&a)? * coerce(&b)?))
        });
        methods.add_meta_function(MetaMethod::IDiv, |_, (a, b): (Value, Value)| {
            let (q, _) = floor_div(&coerce(&a)?, &coerce(&b)?)?;
            Ok(BigIntVal(q))
        });
        methods.add_meta_function(MetaMethod::Mod, |_, (a, b): (Value, Value)| {
            let (_, r) = floor_div(&coerce(&a)?, &coerce(&b)?)?;
            Ok(BigIntVal(r))
        });
        methods.add_meta_function(MetaMethod::Unm, |_, (a, _b): (Value, Value)| {
            Ok(BigIntVal(-coerce(&a)?))
        });

        methods.add_meta_function(MetaMethod::Eq, |_, (a, b): (Value, Value)| {
            Ok(coerce(&a)? == coerce(&b)?)
        });
        methods.add_meta_function(MetaMethod::Lt, |_, (a, b): (Value, Value)| {
            Ok(coerce(&a)? < coerce(&b)?)
        });
        methods.add_meta_function(MetaMethod::Le, |_, (a, b): (Value, Value)| {
            Ok(coerce(&a)? <= coerce(&b)?)
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(this.0.to_string())
        });
    }
}

/// Register the module.
pub(crate) fn install(lua: &Lua) -> mlua::Result<()> {
    let exports = lua.create_table()?;
    exports.set(
        "new",
        lua.create_function(|_, v: Value| Ok(BigIntVal(coerce(&v)?)))?,
    )?;

    let loaded: Table = lua.globals().get::<Table>("package")?.get("loaded")?;
    loaded.set("bigint", exports)
}
