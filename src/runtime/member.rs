use tracing::warn;

use crate::errors::RuntimeError;
use crate::parser::ast::AssignOp;

use super::operators;
use super::value::{format_number, parse_number, Value, ValueType};

/// Array index for a key. `Ok(None)` marks a key that is the right kind
/// but names no position (negative numbers, non-numeric text).
pub fn key_to_index(key: &Value) -> Result<Option<usize>, RuntimeError> {
    let number = match key {
        Value::Null => 0.0,
        Value::Bool(value) => {
            if *value {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(value) => *value,
        Value::String(text) => parse_number(text),
        other => {
            return Err(RuntimeError::UnsupportedKeyType {
                container: ValueType::Array,
                key: other.value_type(),
            })
        }
    };
    if number.is_nan() || number < 0.0 || number.is_infinite() {
        return Ok(None);
    }
    Ok(Some(number.trunc() as usize))
}

pub fn key_to_string(key: &Value) -> Result<String, RuntimeError> {
    match key {
        Value::Bool(value) => Ok(if *value { "1" } else { "0" }.to_string()),
        Value::Number(value) => Ok(format_number(*value)),
        Value::String(text) => Ok(text.clone()),
        Value::Date(date) => Ok(date.to_string()),
        other => Err(RuntimeError::UnsupportedKeyType {
            container: ValueType::Dictionary,
            key: other.value_type(),
        }),
    }
}

pub fn read(object: &Value, key: &Value) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(values) => {
            let values = values.borrow();
            key_to_index(key)?
                .and_then(|index| values.get(index).cloned())
                .ok_or_else(|| RuntimeError::IndexOutOfRange {
                    index: key.to_string(),
                    len: values.len(),
                })
        }
        Value::Dictionary(entries) => {
            let name = key_to_string(key)?;
            Ok(entries.borrow().get(&name).cloned().unwrap_or(Value::Null))
        }
        other => Err(RuntimeError::NotIndexable(other.value_type())),
    }
}

/// Fails when storing `value` inside `container` would make the container
/// reach itself.
pub fn reject_cycle(container: &Value, value: &Value) -> Result<(), RuntimeError> {
    if value.holds(container) {
        return Err(RuntimeError::CyclicReference(container.value_type()));
    }
    Ok(())
}

/// Writes `object[key] op= rhs` and returns the stored value. Array writes
/// outside the current bounds do not grow the array: the combined value is
/// still computed, but nothing is stored and the result is Null.
pub fn assign(object: &Value, key: &Value, op: AssignOp, rhs: Value) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(values) => {
            let index = key_to_index(key)?;
            let current = index.and_then(|index| values.borrow().get(index).cloned());
            match (index, current) {
                (Some(index), Some(current)) => {
                    let next = operators::combine(op, current, rhs)?;
                    reject_cycle(object, &next)?;
                    if let Some(slot) = values.borrow_mut().get_mut(index) {
                        *slot = next.clone();
                    }
                    Ok(next)
                }
                _ => {
                    operators::combine(op, Value::Null, rhs)?;
                    warn!(
                        key = %key,
                        len = values.borrow().len(),
                        "array write outside bounds ignored"
                    );
                    Ok(Value::Null)
                }
            }
        }
        Value::Dictionary(entries) => {
            let name = key_to_string(key)?;
            let current = entries.borrow().get(&name).cloned().unwrap_or(Value::Null);
            let next = operators::combine(op, current, rhs)?;
            reject_cycle(object, &next)?;
            entries.borrow_mut().insert(name, next.clone());
            Ok(next)
        }
        other => Err(RuntimeError::NotIndexable(other.value_type())),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    #[test]
    fn key_coercion_to_index() {
        assert_eq!(key_to_index(&Value::Number(2.9)), Ok(Some(2)));
        assert_eq!(key_to_index(&Value::Bool(true)), Ok(Some(1)));
        assert_eq!(key_to_index(&Value::string("")), Ok(Some(0)));
        assert_eq!(key_to_index(&Value::string("3")), Ok(Some(3)));
        assert_eq!(key_to_index(&Value::string("x")), Ok(None));
        assert_eq!(key_to_index(&Value::Null), Ok(Some(0)));
        assert_eq!(key_to_index(&Value::Number(-1.0)), Ok(None));
    }

    #[test]
    fn dictionary_rejects_null_key() {
        let dict = Value::dictionary(IndexMap::new());
        let err = assign(&dict, &Value::Null, AssignOp::Assign, Value::Number(1.0));
        assert_eq!(
            err,
            Err(RuntimeError::UnsupportedKeyType {
                container: ValueType::Dictionary,
                key: ValueType::Null,
            })
        );
    }

    #[test]
    fn out_of_bounds_write_is_ignored() {
        let array = Value::array(vec![Value::Number(1.0)]);
        let stored = assign(&array, &Value::Number(5.0), AssignOp::Assign, Value::Number(9.0));
        assert_eq!(stored, Ok(Value::Null));
        assert_eq!(array.to_string(), "{1}");
    }
}
