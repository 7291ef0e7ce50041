use crate::lexer::LexError;
use crate::parser::ParseError;

use super::ScriptError;

pub fn underline(line: &str, column: usize) -> String {
    let mut marker = String::new();
    for _ in 1..column {
        marker.push(' ');
    }
    marker.push('^');
    format!("{}\n{}", line, marker)
}

pub fn format_lex_error(source_label: &str, source: &str, err: &LexError) -> String {
    format_located("lex error", source_label, source, &err.message, err.line, err.column)
}

pub fn format_parse_error(source_label: &str, source: &str, err: &ParseError) -> String {
    format_located("parse error", source_label, source, &err.message, err.line, err.column)
}

pub fn format_script_error(source_label: &str, source: &str, err: &ScriptError) -> String {
    match err {
        ScriptError::Lex(err) => format_lex_error(source_label, source, err),
        ScriptError::Parse(err) => format_parse_error(source_label, source, err),
        ScriptError::Runtime(err) => format!("runtime error: {}\n--> {}", err, source_label),
    }
}

fn format_located(
    title: &str,
    source_label: &str,
    source: &str,
    message: &str,
    line: usize,
    column: usize,
) -> String {
    let mut rendered = format!("{}: {}\n--> {}:{}:{}", title, message, source_label, line, column);
    if let Some(text) = source.lines().nth(line.saturating_sub(1)) {
        rendered.push('\n');
        rendered.push_str(&underline(text, column));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_points_at_column() {
        let err = ParseError {
            message: "expected expression".to_string(),
            line: 2,
            column: 5,
        };
        let rendered = format_parse_error("demo.jb", "a = 1;\nb = ;", &err);
        assert_eq!(
            rendered,
            "parse error: expected expression\n--> demo.jb:2:5\nb = ;\n    ^"
        );
    }
}
