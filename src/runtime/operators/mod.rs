//! Binary operator engine.
//!
//! Every `(lhs type, rhs type)` pair maps to exactly one handler in
//! [`handler_for`]; each handler is total over [`BinaryOp`], returning a value
//! or a typed error. Arrays on either side broadcast element-wise.

mod broadcast;
mod pairs;

use crate::errors::RuntimeError;
use crate::parser::ast::{AssignOp, BinaryOp};

use super::value::{Value, ValueType};

pub type Handler = fn(BinaryOp, Value, Value) -> Result<Value, RuntimeError>;

pub fn handler_for(lhs: ValueType, rhs: ValueType) -> Handler {
    use ValueType::*;

    match (lhs, rhs) {
        (Array, _) | (_, Array) => broadcast::array,
        (Dictionary, _) | (_, Dictionary) => pairs::dictionary,
        (Null, Null) => pairs::null_null,
        (Number, Number) => pairs::number_number,
        (String, String) => pairs::string_string,
        (Bool, Bool) => pairs::bool_bool,
        (Number, String) | (String, Number) => pairs::number_string,
        (Bool, String) | (String, Bool) => pairs::bool_string,
        (Bool, Number) | (Number, Bool) => pairs::bool_number,
        (Null, String) | (String, Null) => pairs::null_string,
        (Null, Number) | (Number, Null) => pairs::null_number,
        (Null, Bool) | (Bool, Null) => pairs::null_bool,
        (Date, Date) => pairs::date_date,
        (Binary, Binary) => pairs::binary_binary,
        _ => pairs::mismatched,
    }
}

pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let handler = handler_for(lhs.value_type(), rhs.value_type());
    handler(op, lhs, rhs)
}

/// Combines the current value of an assignment target with the right-hand
/// side. Plain `=` ignores the old value.
pub fn combine(op: AssignOp, current: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op.binary_op() {
        Some(op) => binary(op, current, rhs),
        None => Ok(rhs),
    }
}
