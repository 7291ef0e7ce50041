pub mod errors;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;

use errors::ScriptError;
use parser::ast::Program;
use runtime::value::Value;
use runtime::Runtime;

pub fn parse(source: &str) -> Result<Program, ScriptError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(tokens);
    Ok(parser.parse_program()?)
}

/// Parses and runs `source` on a fresh runtime. Front-end errors and the
/// first runtime failure are both reported as errors; use
/// [`Runtime::run_program`] to keep the partial result instead.
pub fn run(source: &str) -> Result<Value, ScriptError> {
    let program = parse(source)?;
    let mut runtime = Runtime::new();
    Ok(runtime.run_program(&program).into_result()?)
}
