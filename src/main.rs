use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jitterscript::errors::pretty::format_script_error;
use jitterscript::errors::ScriptError;
use jitterscript::runtime::value::{parse_number, Value};
use jitterscript::runtime::{Runtime, RuntimeOptions, DEFAULT_MAX_WHILE_ITERATIONS};

const LOG_ENV: &str = "JITTERSCRIPT_LOG";

/// Run a Jitterbit Script file, or start a REPL when no file is given.
#[derive(Debug, Parser)]
#[command(name = "jitterscript", version, about)]
struct Cli {
    /// Script to execute.
    script: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Fallback cap for `While` loops.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_WHILE_ITERATIONS)]
    max_iterations: u64,

    /// Seed a global before the script runs, e.g. `--set count=3`.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    globals: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("global name cannot be empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

/// Numeric text becomes a number, everything else stays a string.
fn cli_value(text: &str) -> Value {
    let number = parse_number(text);
    if text.trim().is_empty() || number.is_nan() {
        Value::string(text)
    } else {
        Value::Number(number)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let options = RuntimeOptions {
        default_max_while_iterations: cli.max_iterations,
        ..RuntimeOptions::default()
    };

    let globals = cli
        .globals
        .iter()
        .map(|(name, value)| (name.clone(), cli_value(value)))
        .collect::<Vec<_>>();

    let Some(path) = cli.script.clone() else {
        return match jitterscript::repl::run_with_options(options, &globals) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("repl error: {}", err);
                ExitCode::FAILURE
            }
        };
    };

    let label = path.display().to_string();
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("failed to read '{}': {}", label, err);
            return ExitCode::FAILURE;
        }
    };

    match run_source_file(options, &globals, cli.json, &label, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(rendered) => {
            eprintln!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}

fn run_source_file(
    options: RuntimeOptions,
    globals: &[(String, Value)],
    json: bool,
    label: &str,
    source: &str,
) -> Result<(), String> {
    let program =
        jitterscript::parse(source).map_err(|err| format_script_error(label, source, &err))?;

    let mut runtime = Runtime::new()
        .with_options(options)
        .with_source_label(label);
    for (name, value) in globals {
        runtime.scope_mut().set_global(name, value.clone());
    }

    let outcome = runtime.run_program(&program);
    print_value(&outcome.value, json);
    match outcome.error {
        Some(err) => Err(format_script_error(label, source, &ScriptError::Runtime(err))),
        None => Ok(()),
    }
}

fn print_value(value: &Value, json: bool) {
    if json {
        println!("{}", value.to_json());
    } else if !value.is_null() {
        println!("{}", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_assignments() {
        let cli = Cli::try_parse_from([
            "jitterscript",
            "job.jb",
            "--set",
            "count=3",
            "--set",
            "$name=demo",
            "--max-iterations",
            "10",
        ])
        .expect("arguments parse");
        assert_eq!(cli.max_iterations, 10);
        assert_eq!(
            cli.globals,
            vec![
                ("count".to_string(), "3".to_string()),
                ("$name".to_string(), "demo".to_string()),
            ]
        );
        assert_eq!(cli_value("3"), Value::Number(3.0));
        assert_eq!(cli_value("demo"), Value::string("demo"));
    }

    #[test]
    fn rejects_assignment_without_equals() {
        assert!(Cli::try_parse_from(["jitterscript", "--set", "count"]).is_err());
    }
}
