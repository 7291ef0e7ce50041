use std::time::Duration as StdDuration;

use chrono::{Duration, Months};

use crate::errors::RuntimeError;
use crate::runtime::date::DateValue;
use crate::runtime::scope::Scope;
use crate::runtime::value::Value;

use super::{number_arg, p, sig, string_arg, Api, LocalFuture, NativeBody, ParamType, Signature};

/// Larger steps overflow every supported date anyway.
const MAX_DATE_STEP: i64 = 100_000_000;

pub(super) fn register(api: &mut Api) {
    api.native("Now", sig(vec![]), NativeBody::Sync(now));
    api.native("Now_", sig(vec![]), NativeBody::Sync(now_millis));
    api.native(
        "FormatDate",
        vec![
            Signature::new(vec![
                p("date", ParamType::Date),
                p("format", ParamType::String),
            ]),
            Signature::new(vec![
                p("date", ParamType::String),
                p("format", ParamType::String),
            ]),
        ],
        NativeBody::Sync(format_date),
    );
    api.native(
        "DateAdd",
        sig(vec![
            p("datePart", ParamType::String),
            p("number", ParamType::Integer),
            p("date", ParamType::Any),
        ]),
        NativeBody::Sync(date_add),
    );
    api.native(
        "Sleep",
        sig(vec![p("seconds", ParamType::Number)]),
        NativeBody::Async(sleep),
    );
}

fn now(_args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Date(DateValue::now(false)))
}

fn now_millis(_args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    Ok(Value::Date(DateValue::now(true)))
}

fn date_arg(func: &str, value: Option<&Value>) -> Result<DateValue, RuntimeError> {
    match value {
        Some(Value::Date(date)) => Ok(*date),
        Some(Value::String(text)) => DateValue::parse(text)
            .ok_or_else(|| RuntimeError::argument(func, format!("cannot parse '{}' as a date", text))),
        Some(other) => Err(RuntimeError::argument(
            func,
            format!("expected a date, got {}", other.value_type()),
        )),
        None => Err(RuntimeError::argument(func, "missing date argument")),
    }
}

fn format_date(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let date = date_arg("FormatDate", args.first())?;
    let pattern = string_arg(args, 1);
    date.format(&pattern)
        .map(Value::String)
        .ok_or_else(|| RuntimeError::argument("FormatDate", format!("invalid format '{}'", pattern)))
}

/// `DateAdd(part, n, date)` with SQL-style part names.
fn date_add(args: &[Value], _scope: &mut Scope) -> Result<Value, RuntimeError> {
    let part = string_arg(args, 0).to_ascii_lowercase();
    let amount = (number_arg(args, 1) as i64).clamp(-MAX_DATE_STEP, MAX_DATE_STEP);
    let date = date_arg("DateAdd", args.get(2))?;

    let shifted = match part.as_str() {
        "year" | "yy" | "yyyy" => shift_months(&date, amount.saturating_mul(12)),
        "month" | "mm" | "m" => shift_months(&date, amount),
        "week" | "wk" | "ww" => date.checked_add(Duration::weeks(amount)),
        "day" | "dd" | "d" => date.checked_add(Duration::days(amount)),
        "hour" | "hh" => date.checked_add(Duration::hours(amount)),
        "minute" | "mi" | "n" => date.checked_add(Duration::minutes(amount)),
        "second" | "ss" | "s" => date.checked_add(Duration::seconds(amount)),
        "millisecond" | "ms" => date.checked_add(Duration::milliseconds(amount)),
        _ => {
            return Err(RuntimeError::argument(
                "DateAdd",
                format!("unknown date part '{}'", part),
            ))
        }
    };
    shifted
        .map(Value::Date)
        .ok_or_else(|| RuntimeError::argument("DateAdd", "resulting date is out of range"))
}

fn shift_months(date: &DateValue, months: i64) -> Option<DateValue> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    let at = if months >= 0 {
        date.at().checked_add_months(count)?
    } else {
        date.at().checked_sub_months(count)?
    };
    Some(DateValue::new(at, date.has_millis()))
}

fn sleep(args: Vec<Value>) -> LocalFuture<'static> {
    let seconds = number_arg(&args, 0);
    Box::pin(async move {
        if let Ok(duration) = StdDuration::try_from_secs_f64(seconds) {
            tokio::time::sleep(duration).await;
        }
        Ok(Value::Null)
    })
}
