pub mod pretty;

use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::runtime::value::ValueType;

/// Failures raised while evaluating a script. Messages follow the phrasing
/// Jitterbit itself reports, since embedders match on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Local variable '{0}' hasn't been initialized")]
    UninitializedVariable(String),

    #[error("Illegal assignment target: {0}. Only variables and array or dictionary members can be assigned")]
    InvalidAssignmentTarget(&'static str),

    #[error("Illegal operation, {} with incompatible data types: {lhs} {} {rhs}", .op.error_name(), .op.symbol())]
    IllegalOperation {
        op: crate::parser::ast::BinaryOp,
        lhs: ValueType,
        rhs: ValueType,
    },

    #[error("Illegal operation, {} with incompatible data types: {lhs} {} {rhs}. Convert the boolean operand to an integer first", .op.error_name(), .op.symbol())]
    BooleanComparison {
        op: crate::parser::ast::BinaryOp,
        lhs: ValueType,
        rhs: ValueType,
    },

    #[error("Illegal operation, {op} with incompatible data type: {operand}")]
    IllegalUnaryOperation {
        op: &'static str,
        operand: ValueType,
    },

    #[error("Illegal operation, {} with arrays of different sizes: {lhs} and {rhs}", .op.error_name())]
    ArrayLengthMismatch {
        op: crate::parser::ast::BinaryOp,
        lhs: usize,
        rhs: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Array index {index} is out of range (size {len})")]
    IndexOutOfRange { index: String, len: usize },

    #[error("Unsupported key type for {container}: {key}")]
    UnsupportedKeyType {
        container: ValueType,
        key: ValueType,
    },

    #[error("Cannot store a {0} inside itself")]
    CyclicReference(ValueType),

    #[error("Cannot access members of a {0} value")]
    NotIndexable(ValueType),

    #[error("{func}: {message}")]
    ArgumentMismatch { func: String, message: String },

    #[error("While loop exceeded the maximum number of iterations ({limit}). Set $jitterbit.scripting.while.max_iterations to raise the limit")]
    IterationLimitExceeded { limit: u64 },

    #[error("Function '{0}' is not implemented")]
    Unimplemented(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function '{0}' is asynchronous and cannot be called synchronously")]
    AsyncCalledSynchronously(String),

    #[error("{0}")]
    Raised(String),
}

impl RuntimeError {
    pub fn argument(func: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::ArgumentMismatch {
            func: func.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
