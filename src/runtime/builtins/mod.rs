//! Builtin function contract and the standard registry.
//!
//! A builtin follows exactly one calling convention. Synchronous and
//! asynchronous functions receive evaluated, signature-coerced arguments;
//! deferred functions receive a [`Deferred`] handle and decide which argument
//! expressions to evaluate and how often.

mod collections;
mod control;
mod conversion;
mod dates;
mod general;
mod math;
mod strings;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::errors::RuntimeError;
use crate::parser::ast::Expr;

use super::scope::Scope;
use super::value::{Value, ValueType};
use super::Runtime;

pub type LocalFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, RuntimeError>> + 'a>>;

pub type SyncBody = fn(&[Value], &mut Scope) -> Result<Value, RuntimeError>;
pub type AsyncBody = fn(Vec<Value>) -> LocalFuture<'static>;
pub type DeferredBody = fn(&str, &mut Deferred<'_>) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    Sync,
    Async,
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Number,
    Integer,
    String,
    Array,
    Dictionary,
    Date,
    Binary,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Any => "type",
            ParamType::Bool => "bool",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::Array => "array",
            ParamType::Dictionary => "dictionary",
            ParamType::Date => "date",
            ParamType::Binary => "binary",
        }
    }

    /// Types that are never produced by implicit conversion.
    fn strict_type(self) -> Option<ValueType> {
        match self {
            ParamType::Array => Some(ValueType::Array),
            ParamType::Dictionary => Some(ValueType::Dictionary),
            ParamType::Date => Some(ValueType::Date),
            ParamType::Binary => Some(ValueType::Binary),
            _ => None,
        }
    }

    fn accepts(self, value: &Value) -> bool {
        self.strict_type()
            .map_or(true, |expected| value.value_type() == expected)
    }

    fn coerce(self, value: Value) -> Value {
        match self {
            ParamType::Bool => Value::Bool(value.to_bool()),
            ParamType::Number => Value::Number(value.to_number()),
            ParamType::Integer => {
                let number = value.to_number();
                Value::Number(if number.is_nan() { 0.0 } else { number.trunc() })
            }
            ParamType::String => match value {
                Value::String(_) => value,
                other => Value::String(other.to_string()),
            },
            _ => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
    pub optional: bool,
    pub default: Option<&'static str>,
}

impl Param {
    pub fn new(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            optional: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: &'static str) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub params: Vec<Param>,
    /// The last parameter repeats.
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        Self {
            params,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|param| !param.optional).count()
    }

    pub fn max_args(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn accepts_count(&self, count: usize) -> bool {
        count >= self.min_args() && self.max_args().map_or(true, |max| count <= max)
    }

    fn param_at(&self, index: usize) -> Option<&Param> {
        self.params.get(index).or_else(|| {
            if self.variadic {
                self.params.last()
            } else {
                None
            }
        })
    }

    fn accepts(&self, args: &[Value]) -> bool {
        self.accepts_count(args.len())
            && args
                .iter()
                .enumerate()
                .all(|(index, arg)| self.param_at(index).map_or(false, |param| param.ty.accepts(arg)))
    }

    /// Checks strict parameter types, coerces the rest, and fills defaults
    /// for omitted optional parameters.
    pub fn bind(&self, func: &str, args: Vec<Value>) -> Result<Vec<Value>, RuntimeError> {
        if !self.accepts_count(args.len()) {
            return Err(arity_error(func, std::slice::from_ref(self), args.len()));
        }

        let supplied = args.len();
        let mut bound = Vec::with_capacity(supplied.max(self.params.len()));
        for (index, arg) in args.into_iter().enumerate() {
            let Some(param) = self.param_at(index) else {
                break;
            };
            if !param.ty.accepts(&arg) {
                return Err(RuntimeError::argument(
                    func,
                    format!(
                        "argument '{}' must be a {}, got {}",
                        param.name,
                        param.ty.name(),
                        arg.value_type()
                    ),
                ));
            }
            bound.push(param.ty.coerce(arg));
        }

        for param in self.params.iter().skip(supplied) {
            match param.default {
                Some(default) => bound.push(param.ty.coerce(Value::string(default))),
                None => break,
            }
        }
        Ok(bound)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", param.ty.name(), param.name)?;
            if let Some(default) = param.default {
                write!(f, " = {:?}", default)?;
            } else if param.optional {
                f.write_str("?")?;
            }
        }
        if self.variadic {
            f.write_str(", ...")?;
        }
        f.write_str(")")
    }
}

fn arity_error(func: &str, signatures: &[Signature], got: usize) -> RuntimeError {
    let expected = signatures
        .iter()
        .map(|signature| match signature.max_args() {
            Some(max) if max == signature.min_args() => max.to_string(),
            Some(max) => format!("{} to {}", signature.min_args(), max),
            None => format!("at least {}", signature.min_args()),
        })
        .collect::<Vec<_>>()
        .join(" or ");
    RuntimeError::argument(func, format!("expected {} argument(s), got {}", expected, got))
}

/// Argument access for deferred builtins. Each `eval` runs the argument
/// expression again in the caller's scope.
pub struct Deferred<'a> {
    runtime: &'a mut Runtime,
    args: &'a [Expr],
}

impl<'a> Deferred<'a> {
    pub(crate) fn new(runtime: &'a mut Runtime, args: &'a [Expr]) -> Self {
        Self { runtime, args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn eval(&mut self, index: usize) -> Result<Value, RuntimeError> {
        match self.args.get(index) {
            Some(expr) => self.runtime.eval_expr(expr),
            None => Ok(Value::Null),
        }
    }

    pub fn scope(&mut self) -> &mut Scope {
        self.runtime.scope_mut()
    }

    pub fn max_while_iterations(&self) -> u64 {
        self.runtime.max_while_iterations()
    }
}

pub trait Func {
    fn name(&self) -> &str;

    fn signatures(&self) -> &[Signature];

    fn convention(&self) -> Convention;

    fn choose_signature(&self, args: &[Value]) -> Result<&Signature, RuntimeError> {
        let signatures = self.signatures();
        signatures
            .iter()
            .find(|signature| signature.accepts(args))
            .or_else(|| {
                signatures
                    .iter()
                    .find(|signature| signature.accepts_count(args.len()))
            })
            .ok_or_else(|| arity_error(self.name(), signatures, args.len()))
    }

    fn check_arity(&self, count: usize) -> Result<(), RuntimeError> {
        let signatures = self.signatures();
        if signatures.is_empty() || signatures.iter().any(|sig| sig.accepts_count(count)) {
            Ok(())
        } else {
            Err(arity_error(self.name(), signatures, count))
        }
    }

    fn call(&self, _args: Vec<Value>, _scope: &mut Scope) -> Result<Value, RuntimeError> {
        match self.convention() {
            Convention::Async => Err(RuntimeError::AsyncCalledSynchronously(self.name().to_string())),
            _ => Err(RuntimeError::Unimplemented(self.name().to_string())),
        }
    }

    fn call_async<'a>(&'a self, args: Vec<Value>, scope: &'a mut Scope) -> LocalFuture<'a> {
        let result = self.call(args, scope);
        Box::pin(async move { result })
    }

    fn call_eval(&self, _deferred: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
        Err(RuntimeError::Unimplemented(self.name().to_string()))
    }
}

#[derive(Clone, Copy)]
pub enum NativeBody {
    Sync(SyncBody),
    Async(AsyncBody),
    Deferred(DeferredBody),
    /// Registered for name resolution only; calling it fails.
    Stub,
}

pub struct NativeFn {
    name: &'static str,
    signatures: Vec<Signature>,
    body: NativeBody,
}

impl NativeFn {
    pub fn new(name: &'static str, signatures: Vec<Signature>, body: NativeBody) -> Self {
        Self {
            name,
            signatures,
            body,
        }
    }
}

impl Func for NativeFn {
    fn name(&self) -> &str {
        self.name
    }

    fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    fn convention(&self) -> Convention {
        match self.body {
            NativeBody::Async(_) => Convention::Async,
            NativeBody::Deferred(_) => Convention::Deferred,
            NativeBody::Sync(_) | NativeBody::Stub => Convention::Sync,
        }
    }

    fn call(&self, args: Vec<Value>, scope: &mut Scope) -> Result<Value, RuntimeError> {
        match self.body {
            NativeBody::Sync(body) => body(&args, scope),
            NativeBody::Async(_) => Err(RuntimeError::AsyncCalledSynchronously(self.name.to_string())),
            NativeBody::Deferred(_) | NativeBody::Stub => {
                Err(RuntimeError::Unimplemented(self.name.to_string()))
            }
        }
    }

    fn call_async<'a>(&'a self, args: Vec<Value>, scope: &'a mut Scope) -> LocalFuture<'a> {
        match self.body {
            NativeBody::Async(body) => body(args),
            _ => {
                let result = self.call(args, scope);
                Box::pin(async move { result })
            }
        }
    }

    fn call_eval(&self, deferred: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
        match self.body {
            NativeBody::Deferred(body) => body(self.name, deferred),
            _ => Err(RuntimeError::Unimplemented(self.name.to_string())),
        }
    }
}

/// Name-keyed function registry. Lookups are case-sensitive.
pub struct Api {
    funcs: HashMap<String, Box<dyn Func>>,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl Api {
    pub fn empty() -> Self {
        Self {
            funcs: HashMap::new(),
        }
    }

    /// The standard library.
    pub fn new() -> Self {
        let mut api = Self::empty();
        control::register(&mut api);
        general::register(&mut api);
        conversion::register(&mut api);
        strings::register(&mut api);
        collections::register(&mut api);
        math::register(&mut api);
        dates::register(&mut api);
        api
    }

    pub fn register(&mut self, func: impl Func + 'static) {
        self.funcs.insert(func.name().to_string(), Box::new(func));
    }

    pub(crate) fn native(&mut self, name: &'static str, signatures: Vec<Signature>, body: NativeBody) {
        self.register(NativeFn::new(name, signatures, body));
    }

    pub fn get_func(&self, name: &str) -> Option<&dyn Func> {
        self.funcs.get(name).map(|func| func.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = self.funcs.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

/// One-signature shorthand used by the registration tables.
pub(crate) fn sig(params: Vec<Param>) -> Vec<Signature> {
    vec![Signature::new(params)]
}

pub(crate) fn p(name: &'static str, ty: ParamType) -> Param {
    Param::new(name, ty)
}

pub(crate) fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(0.0, Value::to_number)
}

pub(crate) fn string_arg(args: &[Value], index: usize) -> String {
    args.get(index).map(Value::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_coerces_and_fills_defaults() {
        let signature = Signature::new(vec![
            p("text", ParamType::String),
            p("places", ParamType::Integer).with_default("2"),
        ]);
        let bound = signature
            .bind("Demo", vec![Value::Number(7.0)])
            .expect("arguments bind");
        assert_eq!(bound, vec![Value::string("7"), Value::Number(2.0)]);
    }

    #[test]
    fn strict_types_select_overload() {
        let api = Api::new();
        let format_date = api.get_func("FormatDate").expect("FormatDate is registered");
        let args = [Value::string("2024-01-02"), Value::string("%Y")];
        let chosen = format_date.choose_signature(&args).expect("an overload matches");
        assert_eq!(chosen.params[0].ty, ParamType::String);
    }

    #[test]
    fn arity_errors_name_the_function() {
        let signature = Signature::new(vec![p("value", ParamType::Any)]);
        let err = signature.bind("Length", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "Length: expected 1 argument(s), got 0");
    }
}
