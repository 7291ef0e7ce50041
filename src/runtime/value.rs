use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::errors::RuntimeError;

use super::date::DateValue;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type DictionaryRef = Rc<RefCell<IndexMap<String, Value>>>;

/// Runtime value. Arrays and dictionaries are shared handles: cloning a
/// `Value` aliases the container, it never copies the elements.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Binary(Vec<u8>),
    Date(DateValue),
    Array(ArrayRef),
    Dictionary(DictionaryRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Bool,
    Number,
    String,
    Binary,
    Date,
    Array,
    Dictionary,
}

impl ValueType {
    pub const ALL: [ValueType; 8] = [
        ValueType::Null,
        ValueType::Bool,
        ValueType::Number,
        ValueType::String,
        ValueType::Binary,
        ValueType::Date,
        ValueType::Array,
        ValueType::Dictionary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Binary => "binary",
            ValueType::Date => "date",
            ValueType::Array => "array",
            ValueType::Dictionary => "dictionary",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl Value {
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    pub fn dictionary(entries: IndexMap<String, Value>) -> Self {
        Value::Dictionary(Rc::new(RefCell::new(entries)))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Binary(_) => ValueType::Binary,
            Value::Date(_) => ValueType::Date,
            Value::Array(_) => ValueType::Array,
            Value::Dictionary(_) => ValueType::Dictionary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(value) => bool_to_number(*value),
            Value::Number(value) => *value,
            Value::String(text) => parse_number(text),
            Value::Date(date) => date.epoch_seconds(),
            Value::Binary(_) | Value::Array(_) | Value::Dictionary(_) => f64::NAN,
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Number(value) => number_truthy(*value),
            Value::String(text) => string_truthy(text),
            Value::Binary(bytes) => !bytes.is_empty(),
            Value::Date(_) => true,
            Value::Array(values) => !values.borrow().is_empty(),
            Value::Dictionary(entries) => !entries.borrow().is_empty(),
        }
    }

    /// True when `self` is the `container` handle or holds it at any depth.
    /// Scalars hold nothing.
    pub fn holds(&self, container: &Value) -> bool {
        let same = match (self, container) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Dictionary(a), Value::Dictionary(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        same || match self {
            Value::Array(values) => values.borrow().iter().any(|value| value.holds(container)),
            Value::Dictionary(entries) => entries.borrow().values().any(|value| value.holds(container)),
            _ => false,
        }
    }

    /// Copies container contents one level down; scalars are plain clones.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::Array(values) => Value::array(values.borrow().clone()),
            Value::Dictionary(entries) => Value::dictionary(entries.borrow().clone()),
            other => other.clone(),
        }
    }

    pub fn increment(&mut self) -> Result<(), RuntimeError> {
        self.step(1.0, "INCREMENT")
    }

    pub fn decrement(&mut self) -> Result<(), RuntimeError> {
        self.step(-1.0, "DECREMENT")
    }

    fn step(&mut self, delta: f64, op: &'static str) -> Result<(), RuntimeError> {
        match self {
            Value::Number(value) => {
                *value += delta;
                Ok(())
            }
            Value::Null => {
                *self = Value::Number(delta);
                Ok(())
            }
            other => Err(RuntimeError::IllegalUnaryOperation {
                op,
                operand: other.value_type(),
            }),
        }
    }

    /// Logical NOT, in place.
    pub fn negate(&mut self) -> Result<(), RuntimeError> {
        match self {
            Value::Bool(value) => {
                *value = !*value;
                Ok(())
            }
            Value::Number(value) => {
                *self = Value::Bool(!number_truthy(*value));
                Ok(())
            }
            other => Err(RuntimeError::IllegalUnaryOperation {
                op: "NOT",
                operand: other.value_type(),
            }),
        }
    }

    /// Arithmetic unary minus, in place. A bool becomes `-1` or `0`.
    pub fn negative(&mut self) -> Result<(), RuntimeError> {
        match self {
            Value::Number(value) => {
                *value = -*value;
                Ok(())
            }
            Value::Bool(value) => {
                *self = Value::Number(if *value { -1.0 } else { 0.0 });
                Ok(())
            }
            other => Err(RuntimeError::IllegalUnaryOperation {
                op: "NEGATIVE",
                operand: other.value_type(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
                    serde_json::Value::from(*value as i64)
                } else {
                    serde_json::Number::from_f64(*value)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::Binary(bytes) => serde_json::Value::String(hex_encode(bytes)),
            Value::Date(date) => serde_json::Value::String(date.to_string()),
            Value::Array(values) => {
                serde_json::Value::Array(values.borrow().iter().map(Value::to_json).collect())
            }
            Value::Dictionary(entries) => serde_json::Value::Object(
                entries
                    .borrow()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => write!(f, "\"{}\"", text),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => f.write_str(if *value { "1" } else { "0" }),
            Value::Number(value) => f.write_str(&format_number(*value)),
            Value::String(text) => f.write_str(text),
            Value::Binary(bytes) => f.write_str(&hex_encode(bytes)),
            Value::Date(date) => write!(f, "{}", date),
            Value::Array(values) => {
                f.write_str("{")?;
                for (index, value) in values.borrow().iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    value.write_nested(f)?;
                }
                f.write_str("}")
            }
            Value::Dictionary(entries) => {
                f.write_str("[")?;
                for (index, (key, value)) in entries.borrow().iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}=>", key)?;
                    value.write_nested(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

pub fn bool_to_number(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub fn number_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn string_truthy(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("t") {
        return true;
    }
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("false")
        || trimmed.eq_ignore_ascii_case("f")
    {
        return false;
    }
    number_truthy(parse_number(trimmed))
}

/// Numeric reading of a string. Blank text is zero; anything that is not a
/// plain decimal literal is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let plain = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'));
    if !plain {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1.0e15 {
        return format!("{}", value as i64);
    }
    format!("{}", value)
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

pub fn hex_decode(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|start| {
            text.get(start..start + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        })
        .collect()
}
