use indexmap::IndexMap;
use jitterscript::errors::RuntimeError;
use jitterscript::parser::ast::BinaryOp;
use jitterscript::runtime::operators::binary;
use jitterscript::runtime::value::{Value, ValueType};
use jitterscript::runtime::Runtime;
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Result<Value, RuntimeError> {
    let program = jitterscript::parse(source).expect("parse should succeed");
    Runtime::new().run_program(&program).into_result()
}

fn eval_ok(source: &str) -> Value {
    eval(source).expect("script should succeed")
}

fn eval_err(source: &str) -> String {
    eval(source).expect_err("script should fail").to_string()
}

fn sample(ty: ValueType) -> Value {
    match ty {
        ValueType::Null => Value::Null,
        ValueType::Bool => Value::Bool(true),
        ValueType::Number => Value::Number(4.0),
        ValueType::String => Value::string("2"),
        ValueType::Binary => Value::Binary(vec![1, 2]),
        ValueType::Date => Value::Date(
            jitterscript::runtime::date::DateValue::parse("2024-01-02 03:04:05")
                .expect("date should parse"),
        ),
        ValueType::Array => Value::array(vec![Value::Number(1.0), Value::string("3")]),
        ValueType::Dictionary => {
            let mut entries = IndexMap::new();
            entries.insert("k".to_string(), Value::Number(1.0));
            Value::dictionary(entries)
        }
    }
}

#[test]
fn every_type_pair_and_operator_is_defined() {
    for lhs in ValueType::ALL {
        for rhs in ValueType::ALL {
            for op in BinaryOp::ALL {
                match binary(op, sample(lhs), sample(rhs)) {
                    Ok(value) => {
                        let scalar_pair = lhs != ValueType::Array && rhs != ValueType::Array;
                        if scalar_pair && op.class() != jitterscript::parser::ast::OpClass::Arithmetic {
                            assert_eq!(
                                value.value_type(),
                                ValueType::Bool,
                                "{} {} {} should yield a bool",
                                lhs,
                                op.symbol(),
                                rhs
                            );
                        }
                    }
                    Err(err) => assert!(
                        matches!(
                            err,
                            RuntimeError::IllegalOperation { .. }
                                | RuntimeError::BooleanComparison { .. }
                                | RuntimeError::DivisionByZero
                                | RuntimeError::ArrayLengthMismatch { .. }
                        ),
                        "{} {} {} failed with unexpected error {:?}",
                        lhs,
                        op.symbol(),
                        rhs,
                        err
                    ),
                }
            }
        }
    }
}

#[test]
fn golden_error_messages() {
    assert_eq!(
        eval_err("'abc' - 'x'"),
        "Illegal operation, SUBTRACT with incompatible data types: string - string"
    );
    assert_eq!(
        eval_err("true < false"),
        "Illegal operation, LESS THAN with incompatible data types: bool < bool. Convert the boolean operand to an integer first"
    );
    assert_eq!(eval_err("10 / 0"), "Division by zero");
    assert_eq!(
        eval_err("{1, 2} + {1}"),
        "Illegal operation, ADD with arrays of different sizes: 2 and 1"
    );
    assert_eq!(
        eval_err("d = Dict(); d + 1"),
        "Illegal operation, ADD with incompatible data types: dictionary + number"
    );
    assert_eq!(
        eval_err("true * 2"),
        "Illegal operation, MULTIPLY with incompatible data types: bool * number"
    );
    assert_eq!(
        eval_err("x = 'a'; -x"),
        "Illegal operation, NEGATIVE with incompatible data type: string"
    );
}

#[test]
fn string_and_number_addition_concatenates() {
    assert_eq!(eval_ok("'5' + 3"), Value::string("53"));
    assert_eq!(eval_ok("3 + '5'"), Value::string("35"));
    assert_eq!(eval_ok("'10' - 3"), Value::Number(7.0));
    assert_eq!(eval_ok("2 > '10'"), Value::Bool(false));
    assert_eq!(eval_ok("'abc' == 1"), Value::Bool(false));
}

#[test]
fn string_logic_is_always_false() {
    assert_eq!(eval_ok("'a' && 'b'"), Value::Bool(false));
    assert_eq!(eval_ok("'a' || 'b'"), Value::Bool(false));
    assert_eq!(eval_ok("!('a' && 'b')"), Value::Bool(true));
    assert_eq!(eval_ok("'a' < 'b'"), Value::Bool(true));
}

#[test]
fn null_rows() {
    assert_eq!(eval_ok("$n + $m"), Value::Null);
    assert_eq!(eval_ok("$n == $m"), Value::Bool(false));
    assert_eq!(eval_ok("$n != $m"), Value::Bool(true));
    assert_eq!(eval_ok("$n + 5"), Value::Number(5.0));
    assert_eq!(eval_ok("5 + $n"), Value::Number(5.0));
    assert_eq!(eval_ok("$n + 'x'"), Value::string("x"));
    assert_eq!(eval_ok("'x' + $n"), Value::string("x"));
    assert_eq!(eval_ok("$n * 5"), Value::Number(0.0));
    assert_eq!(eval_ok("$n - 5"), Value::Number(-5.0));
    assert_eq!(eval_ok("$n < 'a'"), Value::Bool(true));
    assert_eq!(eval_ok("$n + true"), Value::Bool(true));
    assert_eq!(eval_err("5 / $n"), "Division by zero");
    assert!(eval_err("$n * $m").starts_with("Illegal operation, MULTIPLY"));
}

#[test]
fn bool_rows() {
    assert_eq!(eval_ok("true + 'x'"), Value::string("1x"));
    assert_eq!(eval_ok("'x' + false"), Value::string("x0"));
    assert_eq!(eval_ok("true == 1"), Value::Bool(true));
    assert_eq!(eval_ok("true == 'false'"), Value::Bool(false));
    assert_eq!(eval_ok("true && 2"), Value::Bool(true));
    assert_eq!(eval_ok("false | 'true'"), Value::Bool(true));
    assert!(eval_err("true >= 1").contains("Convert the boolean operand"));
}

#[test]
fn number_logic_is_c_like() {
    assert_eq!(eval_ok("2 && 3"), Value::Bool(true));
    assert_eq!(eval_ok("0 & 3"), Value::Bool(false));
    assert_eq!(eval_ok("0 || -1"), Value::Bool(true));
    assert_eq!(eval_ok("2 ^ 10"), Value::Number(1024.0));
}

#[test]
fn array_broadcast_matches_scalar_rules() {
    assert_eq!(eval_ok("{1, 2} + {10, 20}").to_string(), "{11,22}");
    assert_eq!(eval_ok("{1, {2, 3}} * 2").to_string(), "{2,{4,6}}");
    assert_eq!(eval_ok("10 - {1, 2}").to_string(), "{9,8}");
    assert_eq!(eval_ok("{'a', 1} + 'b'").to_string(), "{\"ab\",\"1b\"}");
    assert_eq!(eval_ok("{1, 2} == {1, 3}").to_string(), "{1,0}");
    assert_eq!(eval_ok("a = {1, 2}; a + a").to_string(), "{2,4}");
}

#[test]
fn array_length_mismatch_fails_for_every_operator() {
    for op in BinaryOp::ALL {
        let result = binary(
            op,
            Value::array(vec![Value::Number(1.0)]),
            Value::array(vec![Value::Number(1.0), Value::Number(2.0)]),
        );
        assert_eq!(
            result,
            Err(RuntimeError::ArrayLengthMismatch { op, lhs: 1, rhs: 2 })
        );
    }
}

#[test]
fn broadcast_mutates_the_array_operand() {
    let array = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
    let result = binary(BinaryOp::Add, array.clone(), Value::Number(1.0))
        .expect("broadcast should succeed");
    assert_eq!(array.to_string(), "{2,3}");
    match (&array, &result) {
        (Value::Array(a), Value::Array(b)) => assert!(std::rc::Rc::ptr_eq(a, b)),
        _ => panic!("expected arrays"),
    }
}

#[test]
fn dictionary_equality_only() {
    assert_eq!(eval_ok("d = Dict(); e = d; d == e"), Value::Bool(true));
    assert_eq!(eval_ok("Dict() != Dict()"), Value::Bool(false));
    assert_eq!(
        eval_ok("d = Dict(); d['a'] = 1; e = Dict(); d == e"),
        Value::Bool(false)
    );
    assert!(eval_err("Dict() < Dict()").starts_with("Illegal operation, LESS THAN"));
}

#[test]
fn mixed_unrelated_types_are_unequal() {
    assert_eq!(
        binary(BinaryOp::Equal, sample(ValueType::Date), Value::Number(1.0)),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        binary(BinaryOp::NotEqual, sample(ValueType::Binary), Value::string("0102")),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        binary(BinaryOp::Less, sample(ValueType::Date), sample(ValueType::Date)),
        Ok(Value::Bool(false))
    );
}

#[test]
fn unary_operators() {
    assert_eq!(eval_ok("!0"), Value::Bool(true));
    assert_eq!(eval_ok("!true"), Value::Bool(false));
    assert_eq!(eval_ok("-(2 + 3)"), Value::Number(-5.0));
    assert_eq!(eval_ok("-true"), Value::Number(-1.0));
    assert_eq!(eval_ok("-false").to_string(), "0");
    assert_eq!(
        eval_err("!'x'"),
        "Illegal operation, NOT with incompatible data type: string"
    );
}

#[test]
fn failed_broadcast_leaves_arrays_untouched() {
    assert_eq!(
        eval_ok("a = {1, true, 3}; Eval(a * 2, 0); a").to_string(),
        "{1,1,3}"
    );
    assert_eq!(
        eval_ok("a = {{1, 2}, {3, true}}; Eval(a - 1, 0); a").to_string(),
        "{{1,2},{3,1}}"
    );
}

#[test]
fn broadcast_rejects_results_that_contain_their_target() {
    assert_eq!(
        eval("a = {1, 2}; b = {a, 1}; a + b"),
        Err(RuntimeError::CyclicReference(ValueType::Array))
    );
    assert_eq!(
        eval_ok("a = {1, 2}; b = {a, 1}; Eval(a + b, 0); a").to_string(),
        "{1,2}"
    );
}
