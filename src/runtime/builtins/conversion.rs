use crate::errors::RuntimeError;
use crate::runtime::scope::Scope;
use crate::runtime::value::{hex_decode, hex_encode, Value};

use super::{number_arg, p, sig, string_arg, Api, NativeBody, ParamType};

pub(super) fn register(api: &mut Api) {
    api.native(
        "String",
        sig(vec![p("arg", ParamType::Any)]),
        NativeBody::Sync(string),
    );
    api.native(
        "Int",
        sig(vec![p("arg", ParamType::Any)]),
        NativeBody::Sync(int),
    );
    api.native(
        "Double",
        sig(vec![p("arg", ParamType::Number)]),
        NativeBody::Sync(double),
    );
    api.native(
        "Bool",
        sig(vec![p("arg", ParamType::Bool)]),
        NativeBody::Sync(boolean),
    );
    api.native(
        "BinaryToHex",
        sig(vec![p("arg", ParamType::Binary)]),
        NativeBody::Sync(binary_to_hex),
    );
    api.native(
        "HexToBinary",
        sig(vec![p("arg", ParamType::String)]),
        NativeBody::Sync(hex_to_binary),
    );
}

fn string(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::String(string_arg(args, 0)))
}

/// Truncates toward zero; text that is not a number becomes 0.
fn int(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let number = number_arg(args, 0);
    if number.is_nan() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(number.trunc()))
}

fn double(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number_arg(args, 0)))
}

fn boolean(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(args.first().map_or(false, Value::to_bool)))
}

fn binary_to_hex(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Binary(bytes)) => Ok(Value::String(hex_encode(bytes))),
        _ => Ok(Value::Null),
    }
}

fn hex_to_binary(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    hex_decode(&text)
        .map(Value::Binary)
        .ok_or_else(|| RuntimeError::argument("HexToBinary", format!("'{}' is not a hex string", text)))
}
