use tracing::warn;

use super::value::Value;

pub const WHILE_MAX_ITERATIONS: &str = "$jitterbit.scripting.while.max_iterations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemDataType {
    Boolean,
    Integer,
    String,
    Array,
}

#[derive(Debug, Clone, Copy)]
pub struct SystemVariable {
    pub name: &'static str,
    pub data_type: SystemDataType,
    pub default: Option<&'static str>,
}

const fn var(
    name: &'static str,
    data_type: SystemDataType,
    default: Option<&'static str>,
) -> SystemVariable {
    SystemVariable {
        name,
        data_type,
        default,
    }
}

pub const SYSTEM_VARIABLES: &[SystemVariable] = &[
    var(WHILE_MAX_ITERATIONS, SystemDataType::Integer, Some("50000")),
    var(
        "$jitterbit.scripting.db.max_rows",
        SystemDataType::Integer,
        Some("10000"),
    ),
    var(
        "$jitterbit.scripting.db.auto_commit",
        SystemDataType::Boolean,
        Some("true"),
    ),
    var(
        "$jitterbit.scripting.hex.enable_null_character",
        SystemDataType::Boolean,
        Some("false"),
    ),
    var(
        "$jitterbit.operation.name",
        SystemDataType::String,
        None,
    ),
    var(
        "$jitterbit.operation.guid",
        SystemDataType::String,
        None,
    ),
    var(
        "$jitterbit.operation.error",
        SystemDataType::String,
        None,
    ),
    var(
        "$jitterbit.operation.last_error",
        SystemDataType::String,
        None,
    ),
    var(
        "$jitterbit.source.filenames",
        SystemDataType::Array,
        None,
    ),
    var(
        "$jitterbit.source.locate_files",
        SystemDataType::Array,
        Some("{}"),
    ),
    var(
        "$jitterbit.target.file_share.create_directories",
        SystemDataType::Boolean,
        Some("false"),
    ),
    var(
        "$jitterbit.api.request.timeout",
        SystemDataType::Integer,
        Some("30"),
    ),
];

impl SystemVariable {
    /// Initial value, or `None` when the variable starts pending.
    pub fn initial_value(&self) -> Option<Value> {
        let default = self.default?;
        match self.data_type {
            SystemDataType::Boolean => Some(Value::Bool(default.eq_ignore_ascii_case("true"))),
            SystemDataType::Integer => default.parse::<f64>().ok().map(Value::Number),
            SystemDataType::String => Some(Value::string(default)),
            SystemDataType::Array => {
                warn!(name = self.name, "array defaults for system variables are not supported");
                None
            }
        }
    }
}
