use indexmap::IndexMap;

use crate::errors::RuntimeError;
use crate::runtime::member::{key_to_string, reject_cycle};
use crate::runtime::scope::Scope;
use crate::runtime::value::{DictionaryRef, Value};

use super::{p, sig, Api, NativeBody, ParamType, Signature};

pub(super) fn register(api: &mut Api) {
    api.native(
        "Array",
        vec![
            Signature::new(vec![]),
            Signature::new(vec![p("item", ParamType::Any)]).variadic(),
        ],
        NativeBody::Sync(array),
    );
    api.native("Dict", sig(vec![]), NativeBody::Sync(dict));
    api.native(
        "AddToDict",
        sig(vec![
            p("dict", ParamType::Dictionary),
            p("key", ParamType::Any),
            p("arg", ParamType::Any),
        ]),
        NativeBody::Sync(add_to_dict),
    );
    api.native(
        "HasKey",
        sig(vec![p("dict", ParamType::Dictionary), p("key", ParamType::Any)]),
        NativeBody::Sync(has_key),
    );
    api.native(
        "GetKeys",
        sig(vec![p("dict", ParamType::Dictionary)]),
        NativeBody::Sync(get_keys),
    );
    api.native(
        "RemoveKey",
        sig(vec![p("dict", ParamType::Dictionary), p("key", ParamType::Any)]),
        NativeBody::Sync(remove_key),
    );
}

fn dictionary_arg<'a>(func: &str, args: &'a [Value]) -> Result<&'a DictionaryRef, RuntimeError> {
    match args.first() {
        Some(Value::Dictionary(entries)) => Ok(entries),
        _ => Err(RuntimeError::argument(func, "first argument must be a dictionary")),
    }
}

fn key_arg(args: &[Value]) -> Result<String, RuntimeError> {
    key_to_string(args.get(1).unwrap_or(&Value::Null))
}

fn array(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::array(args.to_vec()))
}

fn dict(_args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::dictionary(IndexMap::new()))
}

/// Returns true when the key was new.
fn add_to_dict(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let entries = dictionary_arg("AddToDict", args)?;
    let key = key_arg(args)?;
    let value = args.get(2).cloned().unwrap_or(Value::Null);
    reject_cycle(args.first().unwrap_or(&Value::Null), &value)?;
    let previous = entries.borrow_mut().insert(key, value);
    Ok(Value::Bool(previous.is_none()))
}

fn has_key(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let entries = dictionary_arg("HasKey", args)?;
    let key = key_arg(args)?;
    let found = entries.borrow().contains_key(&key);
    Ok(Value::Bool(found))
}

fn get_keys(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let entries = dictionary_arg("GetKeys", args)?;
    let keys = entries.borrow().keys().cloned().map(Value::String).collect();
    Ok(Value::array(keys))
}

fn remove_key(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let entries = dictionary_arg("RemoveKey", args)?;
    let key = key_arg(args)?;
    let removed = entries.borrow_mut().shift_remove(&key);
    Ok(Value::Bool(removed.is_some()))
}
