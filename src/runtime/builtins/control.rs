use tracing::debug;

use crate::errors::RuntimeError;
use crate::runtime::value::Value;

use super::{p, sig, Api, Deferred, NativeBody, ParamType, Signature};

pub(super) fn register(api: &mut Api) {
    api.native(
        "If",
        sig(vec![
            p("condition", ParamType::Bool),
            p("trueResult", ParamType::Any),
            p("falseResult", ParamType::Any).optional(),
        ]),
        NativeBody::Deferred(if_),
    );
    api.native(
        "Case",
        vec![Signature::new(vec![
            p("condition", ParamType::Bool),
            p("result", ParamType::Any),
        ])
        .variadic()],
        NativeBody::Deferred(case),
    );
    api.native(
        "While",
        sig(vec![
            p("condition", ParamType::Bool),
            p("expression", ParamType::Any),
        ]),
        NativeBody::Deferred(while_),
    );
    api.native(
        "Eval",
        sig(vec![
            p("expToEvaluate", ParamType::Any),
            p("defaultResult", ParamType::Any),
        ]),
        NativeBody::Deferred(eval),
    );
}

fn if_(_name: &str, args: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
    if args.eval(0)?.to_bool() {
        args.eval(1)
    } else if args.len() > 2 {
        args.eval(2)
    } else {
        Ok(Value::Null)
    }
}

fn case(name: &str, args: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
    if args.len() % 2 != 0 {
        return Err(RuntimeError::argument(
            name,
            "expects condition/result pairs",
        ));
    }
    for pair in (0..args.len()).step_by(2) {
        if args.eval(pair)?.to_bool() {
            return args.eval(pair + 1);
        }
    }
    Ok(Value::Null)
}

fn while_(_name: &str, args: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
    let limit = args.max_while_iterations();
    let mut runs = 0u64;
    while args.eval(0)?.to_bool() {
        if runs == limit {
            return Err(RuntimeError::IterationLimitExceeded { limit });
        }
        args.eval(1)?;
        runs += 1;
    }
    debug!(iterations = runs, "while loop finished");
    Ok(Value::Null)
}

fn eval(_name: &str, args: &mut Deferred<'_>) -> Result<Value, RuntimeError> {
    match args.eval(0) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!(error = %err, "Eval fell back to its default");
            args.scope().set_last_error(err.to_string());
            args.eval(1)
        }
    }
}
