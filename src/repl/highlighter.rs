pub fn normalize_line(input: &str) -> String {
    input.trim_end().to_string()
}

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_KEYWORD: &str = "\x1b[94m";
const ANSI_STRING: &str = "\x1b[92m";
const ANSI_NUMBER: &str = "\x1b[93m";
const ANSI_COMMENT: &str = "\x1b[90m";
const ANSI_GLOBAL: &str = "\x1b[96m";

/// Literals plus the control-flow builtins, which read like keywords.
const KEYWORDS: &[&str] = &["true", "false", "If", "Case", "While", "Eval"];

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch == '.' || ch == '$' || ch.is_ascii_alphanumeric()
}

/// Byte offset where the identifier ending at `line`'s end begins.
pub fn word_start(line: &str) -> usize {
    let mut start = line.len();
    for (idx, ch) in line.char_indices().rev() {
        if is_word_char(ch) {
            start = idx;
        } else {
            break;
        }
    }
    start
}

pub fn needs_more_input(source: &str) -> bool {
    let mut paren_depth: i32 = 0;
    let mut brace_depth: i32 = 0;
    let mut bracket_depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_block_comment = false;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                let _ = chars.next();
                in_block_comment = false;
            }
            continue;
        }

        if let Some(open) = quote {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        if ch == '/' && chars.peek() == Some(&'/') {
            while let Some(next) = chars.peek() {
                if *next == '\n' {
                    break;
                }
                let _ = chars.next();
            }
            continue;
        }

        if ch == '/' && chars.peek() == Some(&'*') {
            let _ = chars.next();
            in_block_comment = true;
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '{' => brace_depth += 1,
            '}' => brace_depth -= 1,
            '[' => bracket_depth += 1,
            ']' => bracket_depth -= 1,
            _ => {}
        }
    }

    if quote.is_some() || in_block_comment {
        return true;
    }
    if paren_depth > 0 || brace_depth > 0 || bracket_depth > 0 {
        return true;
    }

    let trimmed = source.trim_end();
    if trimmed.is_empty() || trimmed.ends_with("++") || trimmed.ends_with("--") {
        return false;
    }
    ['+', '-', '*', '/', '^', '=', ',', '&', '|', '<', '>']
        .iter()
        .any(|op| trimmed.ends_with(*op))
}

pub fn colorize(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let chars = input.chars().collect::<Vec<_>>();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '/' && chars.get(i + 1) == Some(&'/') {
            out.push_str(ANSI_COMMENT);
            while i < chars.len() && chars[i] != '\n' {
                out.push(chars[i]);
                i += 1;
            }
            out.push_str(ANSI_RESET);
            continue;
        }

        if ch == '"' || ch == '\'' {
            out.push_str(ANSI_STRING);
            out.push(ch);
            i += 1;
            let mut escaped = false;
            while i < chars.len() {
                let current = chars[i];
                out.push(current);
                i += 1;
                if escaped {
                    escaped = false;
                } else if current == '\\' {
                    escaped = true;
                } else if current == ch {
                    break;
                }
            }
            out.push_str(ANSI_RESET);
            continue;
        }

        if ch.is_ascii_digit() {
            out.push_str(ANSI_NUMBER);
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                out.push(chars[i]);
                i += 1;
            }
            out.push_str(ANSI_RESET);
            continue;
        }

        if ch == '$' || ch == '_' || ch.is_ascii_alphabetic() {
            let start = i;
            i += 1;
            while i < chars.len() && is_word_char(chars[i]) && chars[i] != '$' {
                i += 1;
            }
            let word = chars[start..i].iter().collect::<String>();
            let color = if ch == '$' {
                Some(ANSI_GLOBAL)
            } else if KEYWORDS.contains(&word.as_str()) {
                Some(ANSI_KEYWORD)
            } else {
                None
            };
            match color {
                Some(color) => {
                    out.push_str(color);
                    out.push_str(&word);
                    out.push_str(ANSI_RESET);
                }
                None => out.push_str(&word),
            }
            continue;
        }

        out.push(ch);
        i += 1;
    }

    out
}

pub fn complete(prefix: &str, symbols: &[String]) -> Vec<String> {
    let mut candidates = KEYWORDS
        .iter()
        .map(|keyword| keyword.to_string())
        .collect::<Vec<_>>();
    candidates.extend(symbols.iter().cloned());
    candidates.sort();
    candidates.dedup();
    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(prefix))
        .collect()
}
