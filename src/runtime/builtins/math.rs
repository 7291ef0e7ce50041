use crate::errors::RuntimeError;
use crate::runtime::scope::Scope;
use crate::runtime::value::Value;

use super::{number_arg, p, sig, Api, NativeBody, ParamType, SyncBody};

pub(super) fn register(api: &mut Api) {
    api.native(
        "Round",
        sig(vec![
            p("doubleToRound", ParamType::Number),
            p("numPlaces", ParamType::Integer).with_default("0"),
        ]),
        NativeBody::Sync(round),
    );

    let unary: [(&'static str, SyncBody); 3] =
        [("Floor", floor), ("Ceiling", ceiling), ("Sqrt", sqrt)];
    for (name, body) in unary {
        api.native(name, sig(vec![p("arg", ParamType::Number)]), NativeBody::Sync(body));
    }

    api.native(
        "Mod",
        sig(vec![p("x", ParamType::Integer), p("y", ParamType::Integer)]),
        NativeBody::Sync(modulo),
    );
    api.native(
        "Pow",
        sig(vec![p("base", ParamType::Number), p("exp", ParamType::Number)]),
        NativeBody::Sync(pow),
    );
}

fn round(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let value = number_arg(args, 0);
    let places = number_arg(args, 1).clamp(0.0, 15.0) as i32;
    let factor = 10f64.powi(places);
    Ok(Value::Number((value * factor).round() / factor))
}

fn floor(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number_arg(args, 0).floor()))
}

fn ceiling(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number_arg(args, 0).ceil()))
}

fn sqrt(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number_arg(args, 0).sqrt()))
}

fn modulo(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let divisor = number_arg(args, 1);
    if divisor == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(Value::Number(number_arg(args, 0) % divisor))
}

fn pow(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number_arg(args, 0).powf(number_arg(args, 1))))
}
