use jitterscript::errors::{RuntimeError, ScriptError};
use jitterscript::runtime::value::{parse_number, Value};
use jitterscript::runtime::Runtime;
use pretty_assertions::assert_eq;

fn run_outcome(source: &str) -> jitterscript::runtime::ProgramOutcome {
    let program = jitterscript::parse(source).expect("parse should succeed");
    Runtime::new().run_program(&program)
}

#[test]
fn last_statement_value_is_the_result() {
    assert_eq!(
        jitterscript::run("x = 2; y = x * 3; y + 1"),
        Ok(Value::Number(7.0))
    );
    assert_eq!(jitterscript::run(""), Ok(Value::Null));
}

#[test]
fn failing_statement_keeps_the_partial_result() {
    let outcome = run_outcome("a = 'kept'; b = 1 / 0; c = 'never'");
    assert!(!outcome.is_ok());
    assert_eq!(outcome.value, Value::string("kept"));
    assert_eq!(outcome.error, Some(RuntimeError::DivisionByZero));
}

#[test]
fn failing_statement_stops_later_side_effects() {
    let program = jitterscript::parse("$before = 1; RaiseError('stop'); $after = 1")
        .expect("parse should succeed");
    let mut runtime = Runtime::new();
    let outcome = runtime.run_program(&program);

    assert_eq!(outcome.error, Some(RuntimeError::Raised("stop".to_string())));
    assert_eq!(
        runtime.scope().peek_global("$before"),
        Some(&Value::Number(1.0))
    );
    assert_eq!(runtime.scope().peek_global("$after"), None);
    assert_eq!(runtime.scope().last_error(), Some("stop"));
}

#[test]
fn run_wraps_every_stage_error() {
    assert!(matches!(
        jitterscript::run("x = 'open"),
        Err(ScriptError::Lex(_))
    ));
    assert!(matches!(
        jitterscript::run("x = (1"),
        Err(ScriptError::Parse(_))
    ));
    assert_eq!(
        jitterscript::run("'5' + 3; true < false"),
        Err(ScriptError::Runtime(RuntimeError::BooleanComparison {
            op: jitterscript::parser::ast::BinaryOp::Less,
            lhs: jitterscript::runtime::value::ValueType::Bool,
            rhs: jitterscript::runtime::value::ValueType::Bool,
        }))
    );
}

#[test]
fn mixed_addition_concatenates() {
    assert_eq!(jitterscript::run("\"5\" + 3"), Ok(Value::string("53")));
}

#[test]
fn globals_persist_across_programs_on_one_runtime() {
    let mut runtime = Runtime::new();
    let first = jitterscript::parse("$total = 10; local = 1").expect("parse should succeed");
    let second = jitterscript::parse("$total += 5; $total").expect("parse should succeed");

    assert!(runtime.run_program(&first).is_ok());
    assert_eq!(
        runtime.run_program(&second).into_result(),
        Ok(Value::Number(15.0))
    );
}

#[test]
fn system_variables_start_with_defaults() {
    assert_eq!(
        jitterscript::run("$jitterbit.scripting.while.max_iterations"),
        Ok(Value::Number(50_000.0))
    );
    assert_eq!(
        jitterscript::run("$jitterbit.scripting.db.auto_commit"),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        jitterscript::run("IsNull($jitterbit.operation.name)"),
        Ok(Value::Bool(true))
    );
}

#[test]
fn single_operators_evaluate_both_sides() {
    assert_eq!(
        jitterscript::run("x = 0; false & (x = 1); x"),
        Ok(Value::Number(1.0))
    );
    assert_eq!(
        jitterscript::run("x = 0; true || (x = 1); x"),
        Ok(Value::Number(1.0))
    );
}

#[test]
fn trans_wrapped_scripts_run() {
    assert_eq!(
        jitterscript::run("<trans>\n$out = ToUpper('ok');\n$out\n</trans>"),
        Ok(Value::string("OK"))
    );
}

#[test]
fn number_string_round_trip_is_stable() {
    for sample in [0.0, 1.0, -2.5, 1234.5678, 1.0e-7, 3.0e20] {
        let text = Value::Number(sample).to_string();
        assert_eq!(parse_number(&text), sample, "round trip of {}", text);
    }
}

#[test]
fn bool_conversion_is_idempotent() {
    let samples = [
        Value::Null,
        Value::Number(0.0),
        Value::Number(2.0),
        Value::string("false"),
        Value::string("yes"),
        Value::array(vec![]),
    ];
    for sample in samples {
        let once = sample.to_bool();
        assert_eq!(Value::Bool(once).to_bool(), once);
    }
}

#[test]
fn json_rendering_of_nested_values() {
    let value = jitterscript::run("d = Dict(); d['n'] = 1.5; d['list'] = {1, 'a', true}; d")
        .expect("script should succeed");
    assert_eq!(
        value.to_json(),
        serde_json::json!({ "n": 1.5, "list": [1, "a", true] })
    );
}

#[test]
fn custom_functions_can_be_registered() {
    use jitterscript::runtime::builtins::{
        Api, Convention, Func, Param, ParamType, Signature,
    };
    use jitterscript::runtime::scope::Scope;

    struct Twice {
        signatures: Vec<Signature>,
    }

    impl Func for Twice {
        fn name(&self) -> &str {
            "Twice"
        }

        fn signatures(&self) -> &[Signature] {
            &self.signatures
        }

        fn convention(&self) -> Convention {
            Convention::Sync
        }

        fn call(&self, args: Vec<Value>, _scope: &mut Scope) -> Result<Value, RuntimeError> {
            Ok(Value::Number(args[0].to_number() * 2.0))
        }
    }

    let mut api = Api::new();
    api.register(Twice {
        signatures: vec![Signature::new(vec![Param::new("n", ParamType::Number)])],
    });
    let program = jitterscript::parse("Twice('21')").expect("parse should succeed");
    let outcome = Runtime::new().with_api(api).run_program(&program);
    assert_eq!(outcome.into_result(), Ok(Value::Number(42.0)));
}
