use jitterscript::errors::RuntimeError;
use jitterscript::runtime::value::{Value, ValueType};
use jitterscript::runtime::Runtime;
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Result<Value, RuntimeError> {
    let program = jitterscript::parse(source).expect("parse should succeed");
    Runtime::new().run_program(&program).into_result()
}

fn render(source: &str) -> String {
    eval(source).expect("script should succeed").to_string()
}

#[test]
fn compound_assignment_mutates_shared_array() {
    assert_eq!(render("a = {1, 2, 3}; b = a; b += 1; a"), "{2,3,4}");
    assert_eq!(render("a = {5, 6}; b = a; b -= 1; a"), "{4,5}");
}

#[test]
fn plain_assignment_rebinds_without_touching_alias() {
    assert_eq!(render("a = {1, 2}; b = a; b = {9}; a"), "{1,2}");
}

#[test]
fn member_writes_are_visible_through_aliases() {
    assert_eq!(render("a = {1, 2}; b = a; b[0] = 7; a"), "{7,2}");
    assert_eq!(render("d = Dict(); e = d; e['k'] = 'v'; d['k']"), "v");
}

#[test]
fn compound_assignment_on_unset_global_starts_from_null() {
    assert_eq!(eval("$g += 5"), Ok(Value::Number(5.0)));
    assert_eq!(eval("$s += 'x'; $s += 'y'; $s"), Ok(Value::string("xy")));
    assert_eq!(eval("$cnt++; $cnt++; $cnt"), Ok(Value::Number(2.0)));
}

#[test]
fn compound_assignment_on_unset_local_fails() {
    assert_eq!(
        eval("x += 1"),
        Err(RuntimeError::UninitializedVariable("x".to_string()))
    );
    assert_eq!(
        eval("y--").map_err(|err| err.to_string()),
        Err("Local variable 'y' hasn't been initialized".to_string())
    );
    assert_eq!(
        eval("z"),
        Err(RuntimeError::UninitializedVariable("z".to_string()))
    );
}

#[test]
fn prefix_and_postfix_results() {
    assert_eq!(render("x = 1; y = x++; y"), "1");
    assert_eq!(render("x = 1; y = x++; x"), "2");
    assert_eq!(render("x = 1; ++x"), "2");
    assert_eq!(render("x = 1; --x"), "0");
    assert_eq!(render("a = {1, 2}; a[1]++; a"), "{1,3}");
}

#[test]
fn increment_rejects_strings() {
    assert_eq!(
        eval("s = 'a'; s++").map_err(|err| err.to_string()),
        Err("Illegal operation, INCREMENT with incompatible data type: string".to_string())
    );
}

#[test]
fn chained_assignment_returns_stored_value() {
    assert_eq!(render("a = b = 3; a + b"), "6");
    assert_eq!(render("a = 1; b = (a += 4); b"), "5");
}

#[test]
fn dictionary_keys_are_normalized_to_strings() {
    assert_eq!(render("d = Dict(); d[true] = 'v'; GetKeys(d)"), "{\"1\"}");
    assert_eq!(render("d = Dict(); d[2.0] = 'two'; d['2']"), "two");
    assert_eq!(render("d = Dict(); d['n'] += 3; d['n'] += 4; d['n']"), "7");
}

#[test]
fn dictionary_rejects_null_and_container_keys() {
    assert_eq!(
        eval("d = Dict(); d[$missing] = 1").map_err(|err| err.to_string()),
        Err("Unsupported key type for dictionary: null".to_string())
    );
    assert!(matches!(
        eval("d = Dict(); d[{1}] = 1"),
        Err(RuntimeError::UnsupportedKeyType { .. })
    ));
}

#[test]
fn array_keys_coerce_to_positions() {
    assert_eq!(render("a = {1, 2}; a['1']"), "2");
    assert_eq!(render("a = {1, 2}; a[true]"), "2");
    assert_eq!(render("a = {1, 2}; a[1.9]"), "2");
    assert_eq!(render("a = {{1, 2}, {3}}; a[0][1]"), "2");
}

#[test]
fn out_of_range_reads_fail() {
    assert_eq!(
        eval("a = {1}; a[3]").map_err(|err| err.to_string()),
        Err("Array index 3 is out of range (size 1)".to_string())
    );
    assert!(matches!(
        eval("a = {1}; a[-1]"),
        Err(RuntimeError::IndexOutOfRange { .. })
    ));
}

#[test]
fn out_of_range_writes_are_ignored() {
    assert_eq!(eval("a = {1}; a[5] = 2"), Ok(Value::Null));
    assert_eq!(render("a = {1}; a[5] = 2; Length(a)"), "1");
}

#[test]
fn nested_member_assignment() {
    assert_eq!(render("a = {{1}, {2}}; a[1][0] = 5; a"), "{{1},{5}}");
    assert_eq!(
        render("d = Dict(); d['list'] = {1, 2}; d['list'][0] += 10; d['list']"),
        "{11,2}"
    );
}

#[test]
fn assigning_to_non_targets_fails() {
    assert_eq!(
        eval("1 = 2"),
        Err(RuntimeError::InvalidAssignmentTarget("NumericLiteral"))
    );
    assert_eq!(
        eval("++'a'"),
        Err(RuntimeError::InvalidAssignmentTarget("StringLiteral"))
    );
    assert_eq!(
        eval("Length('a') = 2"),
        Err(RuntimeError::InvalidAssignmentTarget("CallExpr"))
    );
}

#[test]
fn indexing_a_scalar_fails() {
    assert_eq!(
        eval("s = 'abc'; s[0]").map_err(|err| err.to_string()),
        Err("Cannot access members of a string value".to_string())
    );
}

#[test]
fn storing_a_container_inside_itself_fails() {
    assert_eq!(
        eval("a = {1, 2}; a[0] = a"),
        Err(RuntimeError::CyclicReference(ValueType::Array))
    );
    assert_eq!(
        eval("a = {1}; b = {a}; a[0] = b").map_err(|err| err.to_string()),
        Err("Cannot store a array inside itself".to_string())
    );
    assert_eq!(
        eval("d = Dict(); d['self'] = {1, d}"),
        Err(RuntimeError::CyclicReference(ValueType::Dictionary))
    );
}

#[test]
fn rejected_cyclic_write_keeps_the_program_alive() {
    let program = jitterscript::parse("a = {1, 2}; a[0] = a; 'unreached'")
        .expect("parse should succeed");
    let mut runtime = Runtime::new();
    let outcome = runtime.run_program(&program);

    assert_eq!(
        outcome.error,
        Some(RuntimeError::CyclicReference(ValueType::Array))
    );
    assert_eq!(outcome.value.to_string(), "{1,2}");
    assert_eq!(
        runtime.scope().get_local("a").map(|value| value.to_string()),
        Ok("{1,2}".to_string())
    );
}

#[test]
fn sibling_references_are_not_cycles() {
    assert_eq!(render("b = {1}; a = {b, b}; a[0] = b; Length(a)"), "2");
    assert_eq!(render("d = Dict(); e = Dict(); d['e'] = e; e['n'] = 1; d['e']['n']"), "1");
}
