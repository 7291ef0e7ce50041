use std::rc::Rc;

use crate::errors::RuntimeError;
use crate::parser::ast::BinaryOp;
use crate::runtime::value::{ArrayRef, Value, ValueType};

use super::binary;

/// Element-wise application. The array operand is updated in place and
/// returned, so every alias of it observes the result. Every element is
/// computed from the operands as they were before the operation, and arrays
/// are only written once all elements succeed: a failure leaves them intact.
pub(super) fn array(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    Ok(plan(op, lhs, rhs)?.commit())
}

/// Pending result of a broadcast: a plain value, or new contents for an
/// existing array.
enum Update {
    Value(Value),
    Array { target: ArrayRef, items: Vec<Update> },
}

impl Update {
    fn array(target: ArrayRef, items: Vec<Update>) -> Result<Update, RuntimeError> {
        if items.iter().any(|item| item.holds(&target)) {
            return Err(RuntimeError::CyclicReference(ValueType::Array));
        }
        Ok(Update::Array { target, items })
    }

    /// Whether committing this update would leave `target` reachable from it.
    fn holds(&self, target: &ArrayRef) -> bool {
        match self {
            Update::Value(value) => value.holds(&Value::Array(Rc::clone(target))),
            Update::Array {
                target: own,
                items,
            } => Rc::ptr_eq(own, target) || items.iter().any(|item| item.holds(target)),
        }
    }

    fn commit(self) -> Value {
        match self {
            Update::Value(value) => value,
            Update::Array { target, items } => {
                let values = items.into_iter().map(Update::commit).collect::<Vec<_>>();
                *target.borrow_mut() = values;
                Value::Array(target)
            }
        }
    }
}

fn plan(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Update, RuntimeError> {
    match (lhs, rhs) {
        (Value::Array(left), Value::Array(right)) => {
            let lhs_items = left.borrow().clone();
            let rhs_items = right.borrow().clone();
            if lhs_items.len() != rhs_items.len() {
                return Err(RuntimeError::ArrayLengthMismatch {
                    op,
                    lhs: lhs_items.len(),
                    rhs: rhs_items.len(),
                });
            }
            let items = lhs_items
                .into_iter()
                .zip(rhs_items)
                .map(|(item, other)| plan(op, item, other))
                .collect::<Result<Vec<_>, _>>()?;
            Update::array(left, items)
        }
        (Value::Array(left), scalar) => {
            let items = left
                .borrow()
                .clone()
                .into_iter()
                .map(|item| plan(op, item, scalar.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            Update::array(left, items)
        }
        (scalar, Value::Array(right)) => {
            let items = right
                .borrow()
                .clone()
                .into_iter()
                .map(|item| plan(op, scalar.clone(), item))
                .collect::<Result<Vec<_>, _>>()?;
            Update::array(right, items)
        }
        (lhs, rhs) => Ok(Update::Value(binary(op, lhs, rhs)?)),
    }
}
