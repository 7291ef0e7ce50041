pub mod builtins;
pub mod date;
pub mod member;
pub mod operators;
pub mod scope;
pub mod system_vars;
pub mod value;

use std::rc::Rc;

use tracing::{debug, error};

use crate::errors::RuntimeError;
use crate::parser::ast::{AssignOp, Expr, Program, UnaryOp};

use self::builtins::{Api, Convention, Deferred, Func};
use self::scope::Scope;
use self::system_vars::WHILE_MAX_ITERATIONS;
use self::value::Value;

pub const DEFAULT_MAX_WHILE_ITERATIONS: u64 = 50_000;

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// `While` cap used when the system variable does not hold a positive
    /// number.
    pub default_max_while_iterations: u64,
    /// Name reported in logs, usually the script path.
    pub source_label: String,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            default_max_while_iterations: DEFAULT_MAX_WHILE_ITERATIONS,
            source_label: "<script>".to_string(),
        }
    }
}

/// Result of running a whole program. A failing statement stops execution;
/// `value` is then the result of the last statement that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOutcome {
    pub value: Value,
    pub error: Option<RuntimeError>,
}

impl ProgramOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Value, RuntimeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

pub struct Runtime {
    scope: Scope,
    api: Rc<Api>,
    options: RuntimeOptions,
    bridge: Option<tokio::runtime::Runtime>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            api: Rc::new(Api::new()),
            options: RuntimeOptions::default(),
            bridge: None,
        }
    }

    pub fn with_options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_api(mut self, api: Api) -> Self {
        self.api = Rc::new(api);
        self
    }

    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.options.source_label = label.into();
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn max_while_iterations(&self) -> u64 {
        match self.scope.peek_global(WHILE_MAX_ITERATIONS).map(Value::to_number) {
            Some(limit) if limit.is_finite() && limit >= 1.0 => limit as u64,
            _ => self.options.default_max_while_iterations,
        }
    }

    pub fn run_program(&mut self, program: &Program) -> ProgramOutcome {
        let mut last_value = Value::Null;
        for (index, statement) in program.statements.iter().enumerate() {
            debug!(statement = index, kind = statement.kind_name(), "evaluating statement");
            match self.eval_expr(statement) {
                Ok(value) => last_value = value,
                Err(err) => {
                    error!(
                        source = %self.options.source_label,
                        statement = index,
                        error = %err,
                        "script halted"
                    );
                    self.scope.set_last_error(err.to_string());
                    return ProgramOutcome {
                        value: last_value,
                        error: Some(err),
                    };
                }
            }
        }

        ProgramOutcome {
            value: last_value,
            error: None,
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::NumericLiteral(value) => Ok(Value::Number(*value)),
            Expr::StringLiteral(value) => Ok(Value::String(value.clone())),
            Expr::BooleanLiteral(value) => Ok(Value::Bool(*value)),
            Expr::Identifier(name) => self.scope.get_local(name),
            Expr::GlobalIdentifier(name) => Ok(self.scope.get_global(name)),
            Expr::ArrayLiteral(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(values))
            }
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { lhs, op, rhs } => {
                let lhs_value = self.eval_expr(lhs)?;
                let rhs_value = self.eval_expr(rhs)?;
                operators::binary(*op, lhs_value, rhs_value)
            }
            Expr::Assign { target, op, value } => self.eval_assign(target, *op, value),
            Expr::Member { object, key } => {
                let object_value = self.eval_expr(object)?;
                let key_value = self.eval_expr(key)?;
                member::read(&object_value, &key_value)
            }
            Expr::Call { name, args } => self.call_function(name, args),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, RuntimeError> {
        if !op.is_update() {
            let mut value = self.eval_expr(operand)?;
            match op {
                UnaryOp::Not => value.negate()?,
                _ => value.negative()?,
            }
            return Ok(value);
        }

        let target = self.resolve_target(operand)?;
        let previous = self.read_target(&target)?;
        let mut updated = previous.clone();
        match op {
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => updated.increment()?,
            _ => updated.decrement()?,
        }
        self.write_target(&target, AssignOp::Assign, updated.clone())?;

        Ok(if op.is_prefix() { updated } else { previous })
    }

    fn eval_assign(
        &mut self,
        target: &Expr,
        op: AssignOp,
        value: &Expr,
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_target(target)?;
        let rhs = self.eval_expr(value)?;
        self.write_target(&target, op, rhs)
    }

    fn resolve_target(&mut self, expr: &Expr) -> Result<Target, RuntimeError> {
        match expr {
            Expr::Identifier(name) => Ok(Target::Local(name.clone())),
            Expr::GlobalIdentifier(name) => Ok(Target::Global(name.clone())),
            Expr::Member { object, key } => {
                let container = self.eval_expr(object)?;
                let key = self.eval_expr(key)?;
                Ok(Target::Member { container, key })
            }
            other => Err(RuntimeError::InvalidAssignmentTarget(other.kind_name())),
        }
    }

    fn read_target(&mut self, target: &Target) -> Result<Value, RuntimeError> {
        match target {
            Target::Local(name) => self.scope.get_local(name),
            Target::Global(name) => Ok(self.scope.get_global(name)),
            Target::Member { container, key } => member::read(container, key),
        }
    }

    /// Stores `target op= rhs`. A compound assignment reads the current value
    /// first: locals must exist, globals start from Null.
    fn write_target(
        &mut self,
        target: &Target,
        op: AssignOp,
        rhs: Value,
    ) -> Result<Value, RuntimeError> {
        match target {
            Target::Member { container, key } => member::assign(container, key, op, rhs),
            Target::Local(name) => {
                let current = match op {
                    AssignOp::Assign => Value::Null,
                    _ => self.scope.get_local(name)?,
                };
                let next = operators::combine(op, current, rhs)?;
                self.scope.set_local(name, next.clone());
                Ok(next)
            }
            Target::Global(name) => {
                let current = match op {
                    AssignOp::Assign => Value::Null,
                    _ => self.scope.get_global(name),
                };
                let next = operators::combine(op, current, rhs)?;
                self.scope.set_global(name, next.clone());
                Ok(next)
            }
        }
    }

    fn call_function(&mut self, name: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        let api = Rc::clone(&self.api);
        let func = api
            .get_func(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;
        debug!(function = name, args = args.len(), "calling builtin");

        match func.convention() {
            Convention::Deferred => {
                func.check_arity(args.len())?;
                let mut deferred = Deferred::new(self, args);
                func.call_eval(&mut deferred)
            }
            Convention::Sync => {
                let prepared = self.prepare_args(func, args)?;
                func.call(prepared, &mut self.scope)
            }
            Convention::Async => {
                let prepared = self.prepare_args(func, args)?;
                let bridge = match self.bridge.take() {
                    Some(bridge) => bridge,
                    None => tokio::runtime::Builder::new_current_thread()
                        .enable_time()
                        .build()
                        .map_err(|err| {
                            RuntimeError::Raised(format!("cannot start async runtime: {}", err))
                        })?,
                };
                let result = bridge.block_on(func.call_async(prepared, &mut self.scope));
                self.bridge = Some(bridge);
                result
            }
        }
    }

    fn prepare_args(&mut self, func: &dyn Func, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let values = args
            .iter()
            .map(|arg| self.eval_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = func.choose_signature(&values)?;
        signature.bind(func.name(), values)
    }
}

/// Assignable location, resolved once so compound updates evaluate the
/// container and key a single time.
enum Target {
    Local(String),
    Global(String),
    Member { container: Value, key: Value },
}
