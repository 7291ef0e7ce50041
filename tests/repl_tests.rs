use jitterscript::repl::highlighter::{complete, needs_more_input, word_start};
use jitterscript::repl::{render_doc, render_vars, CommandAction, Session};
use jitterscript::runtime::builtins::Api;
use jitterscript::runtime::Runtime;

#[test]
fn repl_highlighter_detects_multiline_input() {
    assert!(needs_more_input("If(true,"));
    assert!(needs_more_input("x = {1, 2"));
    assert!(needs_more_input("s = 'open"));
    assert!(needs_more_input("/* still a comment"));
    assert!(needs_more_input("x = 1 +"));
    assert!(!needs_more_input("x = 1 + 2"));
    assert!(!needs_more_input("x++"));
    assert!(!needs_more_input("y = ')' // (\n"));
}

#[test]
fn repl_completion_suggests_keywords_and_symbols() {
    let symbols = vec![
        "ToUpper".to_string(),
        "Trim".to_string(),
        "total".to_string(),
    ];
    let completions = complete("T", &symbols);
    assert_eq!(completions, vec!["ToUpper".to_string(), "Trim".to_string()]);
    assert!(complete("Wh", &symbols).contains(&"While".to_string()));
}

#[test]
fn word_start_includes_global_sigil_and_dots() {
    let line = "x = $jitterbit.oper";
    assert_eq!(&line[word_start(line)..], "$jitterbit.oper");
}

#[test]
fn session_buffers_until_input_is_complete() {
    let mut session = Session::new(Runtime::new());
    assert_eq!(session.prompt(), "jb> ");
    assert_eq!(session.push_line("total = If(true,"), None);
    assert_eq!(session.prompt(), "..> ");
    let input = session.push_line("  10, 20)").expect("input is complete");
    assert_eq!(input, "total = If(true,\n  10, 20)");
    assert_eq!(session.prompt(), "jb> ");
    assert_eq!(session.eval(&input), Ok(None));
    assert_eq!(session.eval("total + 1"), Ok(Some("11".to_string())));
}

#[test]
fn session_reports_errors_and_keeps_state() {
    let mut session = Session::new(Runtime::new());
    assert_eq!(session.eval("$count = 1"), Ok(None));
    let err = session.eval("$count / 0").expect_err("division fails");
    assert!(err.contains("Division by zero"));
    let err = session.eval("x = (").expect_err("parse fails");
    assert!(err.contains("<repl>:1:"));
    assert_eq!(session.eval("$count"), Ok(Some("1".to_string())));
}

#[test]
fn session_meta_commands() {
    let mut session = Session::new(Runtime::new());
    assert_eq!(session.handle_meta_command(":timing off"), CommandAction::Handled);
    assert_eq!(session.handle_meta_command("x = 1"), CommandAction::NotHandled);
    assert_eq!(session.handle_meta_command(":quit"), CommandAction::Exit);
    assert_eq!(session.handle_meta_command("exit"), CommandAction::Exit);
}

#[test]
fn session_symbols_include_builtins_and_variables() {
    let mut session = Session::new(Runtime::new());
    session.eval("counter = 1").expect("assignment succeeds");
    let symbols = session.symbols();
    assert!(symbols.contains(&"counter".to_string()));
    assert!(symbols.contains(&"DateAdd".to_string()));
    assert!(symbols.contains(&"$jitterbit.scripting.while.max_iterations".to_string()));
}

#[test]
fn doc_renders_every_signature() {
    let api = Api::new();
    assert_eq!(
        render_doc(&api, "Left").as_deref(),
        Some("Left(string str, integer n)")
    );
    assert_eq!(
        render_doc(&api, "Index").as_deref(),
        Some("Index(string str, string subStr, integer n = \"1\")")
    );
    let format_date = render_doc(&api, "FormatDate").expect("FormatDate is documented");
    assert_eq!(format_date.lines().count(), 2);
    assert_eq!(render_doc(&api, "Missing"), None);
}

#[test]
fn vars_list_locals_before_globals() {
    let mut session = Session::new(Runtime::new());
    session.eval("name = 'jb'; n = 2").expect("assignments succeed");
    let lines = render_vars(session.runtime());
    assert_eq!(lines[0], "name = \"jb\"");
    assert_eq!(lines[1], "n = 2 (number)");
    assert!(lines
        .iter()
        .any(|line| line == "$jitterbit.scripting.db.auto_commit = 1 (bool)"));
}
