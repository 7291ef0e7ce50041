use crate::errors::RuntimeError;
use crate::runtime::scope::Scope;
use crate::runtime::value::Value;

use super::{number_arg, p, sig, string_arg, Api, NativeBody, ParamType, SyncBody};

pub(super) fn register(api: &mut Api) {
    let unary = |api: &mut Api, name: &'static str, body: SyncBody| {
        api.native(name, sig(vec![p("str", ParamType::String)]), NativeBody::Sync(body));
    };
    unary(api, "ToUpper", to_upper);
    unary(api, "ToLower", to_lower);
    unary(api, "Trim", trim);

    api.native(
        "Left",
        sig(vec![p("str", ParamType::String), p("n", ParamType::Integer)]),
        NativeBody::Sync(left),
    );
    api.native(
        "Right",
        sig(vec![p("str", ParamType::String), p("n", ParamType::Integer)]),
        NativeBody::Sync(right),
    );
    api.native(
        "Mid",
        sig(vec![
            p("str", ParamType::String),
            p("m", ParamType::Integer),
            p("n", ParamType::Integer),
        ]),
        NativeBody::Sync(mid),
    );
    api.native(
        "Replace",
        sig(vec![
            p("str", ParamType::String),
            p("old", ParamType::String),
            p("new", ParamType::String),
        ]),
        NativeBody::Sync(replace),
    );
    api.native(
        "Split",
        sig(vec![
            p("str", ParamType::String),
            p("delimiter", ParamType::String),
        ]),
        NativeBody::Sync(split),
    );
    api.native(
        "Index",
        sig(vec![
            p("str", ParamType::String),
            p("subStr", ParamType::String),
            p("n", ParamType::Integer).with_default("1"),
        ]),
        NativeBody::Sync(index),
    );
}

fn count_arg(args: &[Value], index: usize) -> usize {
    let number = number_arg(args, index);
    if number.is_nan() || number <= 0.0 {
        0
    } else {
        number as usize
    }
}

fn to_upper(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::String(string_arg(args, 0).to_uppercase()))
}

fn to_lower(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::String(string_arg(args, 0).to_lowercase()))
}

fn trim(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::string(string_arg(args, 0).trim()))
}

fn left(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    Ok(Value::String(text.chars().take(count_arg(args, 1)).collect()))
}

fn right(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    let len = text.chars().count();
    let skip = len.saturating_sub(count_arg(args, 1));
    Ok(Value::String(text.chars().skip(skip).collect()))
}

/// `Mid(str, m, n)`: `n` characters starting at zero-based position `m`.
fn mid(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    Ok(Value::String(
        text.chars()
            .skip(count_arg(args, 1))
            .take(count_arg(args, 2))
            .collect(),
    ))
}

fn replace(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    let old = string_arg(args, 1);
    if old.is_empty() {
        return Ok(Value::String(text));
    }
    Ok(Value::String(text.replace(&old, &string_arg(args, 2))))
}

fn split(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    let delimiter = string_arg(args, 1);
    let parts = if delimiter.is_empty() {
        text.chars().map(|ch| Value::String(ch.to_string())).collect()
    } else {
        text.split(delimiter.as_str()).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}

/// Zero-based character position of the `n`th occurrence, or -1. A negative
/// `n` counts from the end.
fn index(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let text = string_arg(args, 0);
    let needle = string_arg(args, 1);
    let nth = number_arg(args, 2);
    if needle.is_empty() || nth == 0.0 || nth.is_nan() {
        return Ok(Value::Number(-1.0));
    }

    let positions = text
        .match_indices(needle.as_str())
        .map(|(byte, _)| text[..byte].chars().count())
        .collect::<Vec<_>>();
    let wanted = nth.abs() as usize;
    let found = if nth > 0.0 {
        wanted.checked_sub(1).and_then(|at| positions.get(at))
    } else {
        positions.len().checked_sub(wanted).and_then(|at| positions.get(at))
    };
    Ok(Value::Number(found.map_or(-1.0, |pos| *pos as f64)))
}
