pub mod highlighter;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Editor, Helper};
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::errors::pretty::format_script_error;
use crate::parser::ast::{Expr, Program};
use crate::runtime::builtins::Api;
use crate::runtime::scope::Slot;
use crate::runtime::value::Value;
use crate::runtime::{Runtime, RuntimeOptions};

const MAX_HISTORY_ENTRIES: usize = 500;
const HISTORY_ENV: &str = "JITTERSCRIPT_REPL_HISTORY";
const SOURCE_LABEL: &str = "<repl>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    NotHandled,
    Handled,
    Exit,
}

#[derive(Clone)]
struct ReplEditorHelper {
    symbols: Arc<Mutex<Vec<String>>>,
}

impl ReplEditorHelper {
    fn new() -> Self {
        Self {
            symbols: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn set_symbols(&self, symbols: Vec<String>) {
        if let Ok(mut guard) = self.symbols.lock() {
            *guard = symbols;
        }
    }

    fn symbols(&self) -> Vec<String> {
        self.symbols
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Helper for ReplEditorHelper {}

impl Hinter for ReplEditorHelper {
    type Hint = String;
}

impl Validator for ReplEditorHelper {
    fn validate(
        &self,
        context: &mut ValidationContext<'_>,
    ) -> Result<ValidationResult, ReadlineError> {
        if highlighter::needs_more_input(context.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Highlighter for ReplEditorHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> std::borrow::Cow<'l, str> {
        std::borrow::Cow::Owned(highlighter::colorize(line))
    }
}

impl Completer for ReplEditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let line = &line[..pos.min(line.len())];
        let start = highlighter::word_start(line);
        let prefix = &line[start..];
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }

        let pairs = highlighter::complete(prefix, &self.symbols())
            .into_iter()
            .map(|value| Pair {
                display: value.clone(),
                replacement: value,
            })
            .collect::<Vec<_>>();
        Ok((start, pairs))
    }
}

/// REPL state shared by the terminal and piped-input loops.
pub struct Session {
    runtime: Runtime,
    history: Vec<String>,
    show_timing: bool,
    buffer: String,
}

impl Session {
    pub fn new(runtime: Runtime) -> Self {
        Self {
            runtime,
            history: Vec::new(),
            show_timing: true,
            buffer: String::new(),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn prompt(&self) -> &'static str {
        if self.buffer.is_empty() {
            "jb> "
        } else {
            "..> "
        }
    }

    /// Names offered for completion: builtins plus every bound variable.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols = self
            .runtime
            .api()
            .names()
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        symbols.extend(self.runtime.scope().locals().into_iter().map(|(name, _)| name));
        symbols.extend(
            self.runtime
                .scope()
                .globals()
                .map(|(name, _)| name.to_string()),
        );
        symbols
    }

    /// Feeds one line. Returns the complete input once brackets, strings and
    /// comments are balanced.
    pub fn push_line(&mut self, raw_line: &str) -> Option<String> {
        let normalized = highlighter::normalize_line(raw_line);
        if self.buffer.is_empty() && normalized.trim().is_empty() {
            return None;
        }
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(&normalized);

        if highlighter::needs_more_input(&self.buffer) {
            return None;
        }

        let input = std::mem::take(&mut self.buffer);
        if !input.trim().is_empty() {
            self.history.push(input.clone());
            trim_history(&mut self.history);
        }
        Some(input)
    }

    /// Evaluates a complete input. `Ok` carries the text to echo, if any.
    pub fn eval(&mut self, input: &str) -> Result<Option<String>, String> {
        let program = crate::parse(input)
            .map_err(|err| format_script_error(SOURCE_LABEL, input, &err))?;
        let should_echo = should_echo_repl_result(&program);
        let outcome = self.runtime.run_program(&program);
        if let Some(err) = outcome.error {
            return Err(format_script_error(SOURCE_LABEL, input, &err.into()));
        }
        if should_echo && !outcome.value.is_null() {
            Ok(Some(outcome.value.to_string()))
        } else {
            Ok(None)
        }
    }

    fn run_input(&mut self, input: &str) {
        let started = Instant::now();
        match self.eval(input) {
            Ok(echo) => {
                if let Some(text) = echo {
                    println!("{}", text);
                }
                if self.show_timing {
                    println!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1000.0);
                }
            }
            Err(rendered) => eprintln!("{}", rendered),
        }
    }

    pub fn handle_meta_command(&mut self, command: &str) -> CommandAction {
        if command.is_empty() || !self.buffer.is_empty() {
            return CommandAction::NotHandled;
        }
        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            return CommandAction::Exit;
        }
        if !command.starts_with(':') {
            return CommandAction::NotHandled;
        }

        let mut parts = command.split_whitespace();
        let directive = parts.next().unwrap_or_default();
        match directive {
            ":quit" | ":exit" => return CommandAction::Exit,
            ":help" => {
                println!(":help                   Show this message");
                println!(":doc <Function>         Show builtin signatures");
                println!(":vars                   List variables and their values");
                println!(":complete <prefix>      Show completion suggestions");
                println!(":history [n]            Show recent history (default 20)");
                println!(":timing on|off          Toggle evaluation timing output");
                println!(":quit                   Exit REPL");
            }
            ":doc" => match parts.next() {
                Some(name) => match render_doc(self.runtime.api(), name) {
                    Some(text) => println!("{}", text),
                    None => eprintln!("no builtin named '{}'", name),
                },
                None => eprintln!("usage: :doc <Function>"),
            },
            ":vars" => {
                for line in render_vars(&self.runtime) {
                    println!("{}", line);
                }
            }
            ":complete" => {
                let Some(prefix) = parts.next() else {
                    eprintln!("usage: :complete <prefix>");
                    return CommandAction::Handled;
                };
                let suggestions = highlighter::complete(prefix, &self.symbols());
                if suggestions.is_empty() {
                    println!("(no matches)");
                } else {
                    for suggestion in suggestions {
                        println!("{}", suggestion);
                    }
                }
            }
            ":history" => {
                let count = parts
                    .next()
                    .and_then(|value| value.parse::<usize>().ok())
                    .unwrap_or(20);
                let start = self.history.len().saturating_sub(count);
                for (idx, entry) in self.history.iter().enumerate().skip(start) {
                    println!("{:>4} {}", idx + 1, highlighter::colorize(entry));
                }
            }
            ":timing" => match parts.next() {
                Some("on") => {
                    self.show_timing = true;
                    println!("timing: on");
                }
                Some("off") => {
                    self.show_timing = false;
                    println!("timing: off");
                }
                _ => eprintln!("usage: :timing on|off"),
            },
            other => {
                eprintln!("unknown command '{}'; use :help", other);
            }
        }

        CommandAction::Handled
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    run_with_options(RuntimeOptions::default(), &[])
}

pub fn run_with_options(
    options: RuntimeOptions,
    globals: &[(String, Value)],
) -> Result<(), Box<dyn Error>> {
    let mut runtime = Runtime::new()
        .with_options(options)
        .with_source_label(SOURCE_LABEL);
    for (name, value) in globals {
        runtime.scope_mut().set_global(name, value.clone());
    }

    let mut session = Session::new(runtime);
    session.history = load_history();

    println!("Jitterbit Script REPL");
    println!("Commands: :help, :doc <Function>, :vars, :complete <prefix>, :history, :timing on|off, :quit");
    println!("Multi-line mode is automatic while brackets, strings or comments are open.");

    if io::stdin().is_terminal() {
        let helper = ReplEditorHelper::new();
        helper.set_symbols(session.symbols());
        let mut editor = Editor::<ReplEditorHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(helper.clone()));

        for entry in &session.history {
            let _ = editor.add_history_entry(entry.as_str());
        }

        loop {
            let raw_line = match editor.readline(session.prompt()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(Box::new(err)),
            };

            match session.handle_meta_command(raw_line.trim()) {
                CommandAction::NotHandled => {}
                CommandAction::Handled => continue,
                CommandAction::Exit => break,
            }

            let Some(input) = session.push_line(&raw_line) else {
                continue;
            };
            let _ = editor.add_history_entry(input.as_str());
            session.run_input(&input);
            helper.set_symbols(session.symbols());
        }
    } else {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("{}", session.prompt());
            io::stdout().flush()?;

            line.clear();
            if stdin.read_line(&mut line)? == 0 {
                break;
            }

            let raw_line = line.trim_end_matches(['\n', '\r']);
            match session.handle_meta_command(raw_line.trim()) {
                CommandAction::NotHandled => {}
                CommandAction::Handled => continue,
                CommandAction::Exit => break,
            }

            if let Some(input) = session.push_line(raw_line) {
                session.run_input(&input);
            }
        }
    }

    if let Err(err) = save_history(&session.history) {
        eprintln!("failed to save repl history: {}", err);
    }

    Ok(())
}

/// `:doc` text: one line per overload.
pub fn render_doc(api: &Api, name: &str) -> Option<String> {
    let func = api.get_func(name)?;
    let lines = func
        .signatures()
        .iter()
        .map(|signature| format!("{}{}", func.name(), signature))
        .collect::<Vec<_>>();
    Some(lines.join("\n"))
}

/// `:vars` lines: locals first, then globals that hold a value.
pub fn render_vars(runtime: &Runtime) -> Vec<String> {
    let scope = runtime.scope();
    let mut lines = scope
        .locals()
        .into_iter()
        .map(|(name, value)| format!("{} = {}", name, describe(&value)))
        .collect::<Vec<_>>();
    lines.extend(scope.globals().filter_map(|(name, slot)| match slot {
        Slot::Initialized(value) => Some(format!("{} = {}", name, describe(value))),
        Slot::Pending => None,
    }));
    lines
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => format!("{:?}", text),
        Value::Null => "null".to_string(),
        other => format!("{} ({})", other, other.value_type()),
    }
}

fn load_history() -> Vec<String> {
    let path = repl_history_path();
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn save_history(history: &[String]) -> io::Result<()> {
    let path = repl_history_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut trimmed = history.to_vec();
    trim_history(&mut trimmed);
    let mut encoded = trimmed.join("\n");
    if !encoded.is_empty() {
        encoded.push('\n');
    }
    fs::write(path, encoded)
}

fn trim_history(history: &mut Vec<String>) {
    if history.len() > MAX_HISTORY_ENTRIES {
        let drop_count = history.len() - MAX_HISTORY_ENTRIES;
        history.drain(0..drop_count);
    }
}

fn repl_history_path() -> PathBuf {
    if let Ok(path) = std::env::var(HISTORY_ENV) {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".jitterscript").join("repl_history");
    }
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".jitterscript").join("repl_history");
    }
    PathBuf::from(".jitterscript_repl_history")
}

/// Echo only single side-effect-free expressions; assignments and calls stay
/// quiet.
pub fn should_echo_repl_result(program: &Program) -> bool {
    match program.statements.as_slice() {
        [expr] => is_echoable_expr(expr),
        _ => false,
    }
}

fn is_echoable_expr(expr: &Expr) -> bool {
    match expr {
        Expr::NumericLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::BooleanLiteral(_)
        | Expr::Identifier(_)
        | Expr::GlobalIdentifier(_) => true,
        Expr::Unary { op, operand } => !op.is_update() && is_echoable_expr(operand),
        Expr::Binary { lhs, rhs, .. } => is_echoable_expr(lhs) && is_echoable_expr(rhs),
        Expr::Member { object, key } => is_echoable_expr(object) && is_echoable_expr(key),
        Expr::ArrayLiteral(items) => items.iter().all(is_echoable_expr),
        Expr::Call { .. } | Expr::Assign { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::should_echo_repl_result;

    fn parse_program(source: &str) -> crate::parser::ast::Program {
        crate::parse(source).expect("parse should succeed")
    }

    #[test]
    fn repl_echoes_simple_expression_only() {
        assert!(should_echo_repl_result(&parse_program("name")));
        assert!(should_echo_repl_result(&parse_program("1 + 2")));
        assert!(should_echo_repl_result(&parse_program("$total[0]")));
        assert!(!should_echo_repl_result(&parse_program("name = \"jb\"")));
        assert!(!should_echo_repl_result(&parse_program("count++")));
        assert!(!should_echo_repl_result(&parse_program("Length({1, 2, 3})")));
    }
}
