use tracing::info;

use crate::errors::RuntimeError;
use crate::parser::ast::AssignOp;
use crate::runtime::member;
use crate::runtime::scope::Scope;
use crate::runtime::value::Value;

use super::{p, sig, string_arg, Api, NativeBody, ParamType, Signature};

pub(super) fn register(api: &mut Api) {
    api.native("Null", sig(vec![]), NativeBody::Sync(null));
    api.native(
        "IsNull",
        sig(vec![p("arg", ParamType::Any)]),
        NativeBody::Sync(is_null),
    );
    api.native(
        "Length",
        sig(vec![p("arg", ParamType::Any)]),
        NativeBody::Sync(length),
    );
    api.native(
        "Get",
        vec![Signature::new(vec![
            p("name", ParamType::String),
            p("index", ParamType::Any).optional(),
        ])
        .variadic()],
        NativeBody::Sync(get),
    );
    api.native(
        "Set",
        vec![Signature::new(vec![
            p("name", ParamType::String),
            p("value", ParamType::Any),
            p("index", ParamType::Any).optional(),
        ])
        .variadic()],
        NativeBody::Sync(set),
    );
    api.native(
        "RaiseError",
        sig(vec![p("message", ParamType::String)]),
        NativeBody::Sync(raise_error),
    );
    api.native("GetLastError", sig(vec![]), NativeBody::Sync(get_last_error));
    api.native(
        "WriteToOperationLog",
        sig(vec![p("message", ParamType::String)]),
        NativeBody::Sync(write_to_operation_log),
    );
    api.native(
        "RunOperation",
        sig(vec![
            p("operationId", ParamType::String),
            p("synchronous", ParamType::Bool).with_default("true"),
        ]),
        NativeBody::Stub,
    );
}

fn null(_args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Null)
}

fn is_null(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(args.first().map_or(true, Value::is_null)))
}

fn length(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let len = match args.first() {
        None | Some(Value::Null) => 0,
        Some(Value::Array(values)) => values.borrow().len(),
        Some(Value::Dictionary(entries)) => entries.borrow().len(),
        Some(Value::Binary(bytes)) => bytes.len(),
        Some(other) => other.to_string().chars().count(),
    };
    Ok(Value::Number(len as f64))
}

/// `Get(name, i, j, ...)` reads a variable and indexes into it.
fn get(args: &[Value], scope: &mut Scope) -> Result<Value, RuntimeError> {
    let name = string_arg(args, 0);
    let mut value = if name.starts_with('$') {
        scope.get_global(&name)
    } else {
        scope.get_local(&name).unwrap_or(Value::Null)
    };
    for key in args.iter().skip(1) {
        value = member::read(&value, key)?;
    }
    Ok(value)
}

/// `Set(name, value, i, j, ...)` assigns a variable or one of its members.
fn set(args: &[Value], scope: &mut Scope) -> Result<Value, RuntimeError> {
    let name = string_arg(args, 0);
    let value = args.get(1).cloned().unwrap_or(Value::Null);
    let keys = args.get(2..).unwrap_or_default();

    let Some((last, path)) = keys.split_last() else {
        scope.set(&name, value.clone());
        return Ok(value);
    };

    let mut container = scope.get(&name)?;
    for key in path {
        container = member::read(&container, key)?;
    }
    member::assign(&container, last, AssignOp::Assign, value)
}

fn raise_error(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Err(RuntimeError::Raised(string_arg(args, 0)))
}

fn get_last_error(_args: &[Value], scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::string(scope.last_error().unwrap_or_default()))
}

fn write_to_operation_log(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let message = string_arg(args, 0);
    info!(target: "jitterscript::operation_log", "{}", message);
    Ok(Value::String(message))
}
