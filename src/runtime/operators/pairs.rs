use std::cmp::Ordering;
use std::rc::Rc;

use crate::errors::RuntimeError;
use crate::parser::ast::{BinaryOp, OpClass};
use crate::runtime::value::{number_truthy, Value};

fn illegal(op: BinaryOp, lhs: &Value, rhs: &Value) -> RuntimeError {
    RuntimeError::IllegalOperation {
        op,
        lhs: lhs.value_type(),
        rhs: rhs.value_type(),
    }
}

fn bool_ordering(op: BinaryOp, lhs: &Value, rhs: &Value) -> RuntimeError {
    RuntimeError::BooleanComparison {
        op,
        lhs: lhs.value_type(),
        rhs: rhs.value_type(),
    }
}

fn arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Power => a.powf(b),
        _ => return Ok(Value::Null),
    };
    Ok(Value::Number(result))
}

/// Applies a comparison operator to an ordering; `None` (unordered, e.g. NaN)
/// makes everything false except `!=`.
fn compare(op: BinaryOp, ordering: Option<Ordering>) -> Value {
    let result = match (op, ordering) {
        (BinaryOp::NotEqual, None) => true,
        (_, None) => false,
        (BinaryOp::Less, Some(ord)) => ord == Ordering::Less,
        (BinaryOp::Greater, Some(ord)) => ord == Ordering::Greater,
        (BinaryOp::LessEqual, Some(ord)) => ord != Ordering::Greater,
        (BinaryOp::GreaterEqual, Some(ord)) => ord != Ordering::Less,
        (BinaryOp::Equal, Some(ord)) => ord == Ordering::Equal,
        (BinaryOp::NotEqual, Some(ord)) => ord != Ordering::Equal,
        _ => false,
    };
    Value::Bool(result)
}

fn logical(op: BinaryOp, a: bool, b: bool) -> Value {
    match op {
        BinaryOp::LogicalAnd | BinaryOp::And => Value::Bool(a && b),
        _ => Value::Bool(a || b),
    }
}

fn equality(op: BinaryOp, equal: bool) -> Value {
    Value::Bool(if op == BinaryOp::NotEqual { !equal } else { equal })
}

/// `+` on concatenable pairs; operands keep their order.
fn concat(lhs: &Value, rhs: &Value) -> Value {
    Value::String(format!("{}{}", lhs, rhs))
}

/// `Null + x` and `x + Null` both yield `x`.
fn absorb_null(lhs: Value, rhs: Value) -> Value {
    if lhs.is_null() {
        rhs
    } else {
        lhs
    }
}

pub(super) fn null_null(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add | BinaryOp::Subtract => Ok(Value::Null),
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Power => Err(illegal(op, &lhs, &rhs)),
        BinaryOp::NotEqual => Ok(Value::Bool(true)),
        _ => Ok(Value::Bool(false)),
    }
}

pub(super) fn number_number(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (a, b) = (lhs.to_number(), rhs.to_number());
    match op.class() {
        OpClass::Arithmetic => arithmetic(op, a, b),
        OpClass::Comparison => Ok(compare(op, a.partial_cmp(&b))),
        OpClass::Logical => Ok(logical(op, number_truthy(a), number_truthy(b))),
    }
}

pub(super) fn string_string(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (Value::String(a), Value::String(b)) = (&lhs, &rhs) else {
        return Err(illegal(op, &lhs, &rhs));
    };
    match op.class() {
        OpClass::Arithmetic if op == BinaryOp::Add => Ok(Value::String(format!("{}{}", a, b))),
        OpClass::Arithmetic => Err(illegal(op, &lhs, &rhs)),
        OpClass::Comparison => Ok(compare(op, Some(a.cmp(b)))),
        OpClass::Logical => Ok(Value::Bool(false)),
    }
}

pub(super) fn bool_bool(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (a, b) = (lhs.to_bool(), rhs.to_bool());
    match op.class() {
        OpClass::Arithmetic => Err(illegal(op, &lhs, &rhs)),
        OpClass::Comparison if op.is_ordering() => Err(bool_ordering(op, &lhs, &rhs)),
        OpClass::Comparison => Ok(equality(op, a == b)),
        OpClass::Logical => Ok(logical(op, a, b)),
    }
}

pub(super) fn number_string(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (a, b) = (lhs.to_number(), rhs.to_number());
    match op.class() {
        OpClass::Arithmetic if op == BinaryOp::Add => Ok(concat(&lhs, &rhs)),
        OpClass::Arithmetic => arithmetic(op, a, b),
        OpClass::Comparison => Ok(compare(op, a.partial_cmp(&b))),
        OpClass::Logical => Ok(logical(op, number_truthy(a), number_truthy(b))),
    }
}

pub(super) fn bool_string(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op.class() {
        OpClass::Arithmetic if op == BinaryOp::Add => Ok(concat(&lhs, &rhs)),
        _ => bool_with_other(op, lhs, rhs),
    }
}

pub(super) fn bool_number(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    bool_with_other(op, lhs, rhs)
}

pub(super) fn null_bool(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => Ok(absorb_null(lhs, rhs)),
        _ => bool_with_other(op, lhs, rhs),
    }
}

/// Shared row for a bool against a non-bool scalar: no arithmetic, no
/// ordering, equality and logic on truthiness.
fn bool_with_other(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (a, b) = (lhs.to_bool(), rhs.to_bool());
    match op.class() {
        OpClass::Arithmetic => Err(illegal(op, &lhs, &rhs)),
        OpClass::Comparison if op.is_ordering() => Err(bool_ordering(op, &lhs, &rhs)),
        OpClass::Comparison => Ok(equality(op, a == b)),
        OpClass::Logical => Ok(logical(op, a, b)),
    }
}

pub(super) fn null_string(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op.class() {
        OpClass::Arithmetic if op == BinaryOp::Add => Ok(absorb_null(lhs, rhs)),
        OpClass::Arithmetic => Err(illegal(op, &lhs, &rhs)),
        OpClass::Comparison => {
            let (a, b) = (lhs.to_string(), rhs.to_string());
            Ok(compare(op, Some(a.cmp(&b))))
        }
        OpClass::Logical => Ok(logical(op, lhs.to_bool(), rhs.to_bool())),
    }
}

pub(super) fn null_number(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (a, b) = (lhs.to_number(), rhs.to_number());
    match op.class() {
        OpClass::Arithmetic if op == BinaryOp::Add => Ok(absorb_null(lhs, rhs)),
        OpClass::Arithmetic => arithmetic(op, a, b),
        OpClass::Comparison => Ok(compare(op, a.partial_cmp(&b))),
        OpClass::Logical => Ok(logical(op, number_truthy(a), number_truthy(b))),
    }
}

pub(super) fn date_date(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (Value::Date(a), Value::Date(b)) = (&lhs, &rhs) else {
        return Err(illegal(op, &lhs, &rhs));
    };
    match op {
        BinaryOp::Equal | BinaryOp::NotEqual => Ok(equality(op, a == b)),
        _ if op.is_ordering() => Ok(compare(op, a.partial_cmp(b))),
        _ => Err(illegal(op, &lhs, &rhs)),
    }
}

pub(super) fn binary_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Equal | BinaryOp::NotEqual => Ok(equality(op, lhs == rhs)),
        _ => Err(illegal(op, &lhs, &rhs)),
    }
}

/// Dictionaries only take part in equality, either by identity or by their
/// rendered form.
pub(super) fn dictionary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let same = match (&lhs, &rhs) {
                (Value::Dictionary(a), Value::Dictionary(b)) if Rc::ptr_eq(a, b) => true,
                _ => lhs.to_string() == rhs.to_string(),
            };
            Ok(equality(op, same))
        }
        _ => Err(illegal(op, &lhs, &rhs)),
    }
}

/// Pairs with no conversion between them are never equal and support nothing
/// else.
pub(super) fn mismatched(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Equal => Ok(Value::Bool(false)),
        BinaryOp::NotEqual => Ok(Value::Bool(true)),
        _ => Err(illegal(op, &lhs, &rhs)),
    }
}
