pub mod token;

use thiserror::Error;

use token::{Token, TokenKind};

const TRANS_OPEN: &str = "<trans>";
const TRANS_CLOSE: &str = "</trans>";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("lex error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let chars = isolate_trans_block(source)?;
    Lexer::new(chars).lex()
}

/// Blanks everything outside a `<trans>` ... `</trans>` pair, keeping newlines
/// so token positions still point into the original text.
fn isolate_trans_block(source: &str) -> Result<Vec<char>, LexError> {
    let chars = source.chars().collect::<Vec<_>>();
    let lowered = chars
        .iter()
        .map(|c| c.to_ascii_lowercase())
        .collect::<Vec<_>>();

    let Some(open) = find_chars(&lowered, TRANS_OPEN, 0) else {
        return Ok(chars);
    };
    let body_start = open + TRANS_OPEN.len();
    let Some(close) = find_chars(&lowered, TRANS_CLOSE, body_start) else {
        let (line, column) = position_of(&chars, open);
        return Err(LexError::new("missing closing </trans> tag", line, column));
    };

    Ok(chars
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            if (body_start..close).contains(&idx) || *c == '\n' {
                *c
            } else {
                ' '
            }
        })
        .collect())
}

fn find_chars(haystack: &[char], needle: &str, from: usize) -> Option<usize> {
    let needle = needle.chars().collect::<Vec<_>>();
    if haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&start| haystack[start..start + needle.len()] == needle[..])
}

fn position_of(chars: &[char], offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in &chars[..offset] {
        if *c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

struct Lexer {
    chars: Vec<char>,
    current: usize,
    start: usize,
    line: usize,
    column: usize,
    token_line: usize,
    token_column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(chars: Vec<char>) -> Self {
        Self {
            chars,
            current: 0,
            start: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
            tokens: Vec::new(),
        }
    }

    fn lex(mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.start_token();
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            self.column,
        ));

        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '^' => self.add_token(TokenKind::Caret),
            '+' => {
                if self.matches('+') {
                    self.add_token(TokenKind::PlusPlus);
                } else if self.matches('=') {
                    self.add_token(TokenKind::PlusEqual);
                } else {
                    self.add_token(TokenKind::Plus);
                }
            }
            '-' => {
                if self.matches('-') {
                    self.add_token(TokenKind::MinusMinus);
                } else if self.matches('=') {
                    self.add_token(TokenKind::MinusEqual);
                } else {
                    self.add_token(TokenKind::Minus);
                }
            }
            '!' => {
                if self.matches('=') {
                    self.add_token(TokenKind::BangEqual);
                } else {
                    self.add_token(TokenKind::Bang);
                }
            }
            '=' => {
                if self.matches('=') {
                    self.add_token(TokenKind::EqualEqual);
                } else {
                    self.add_token(TokenKind::Equal);
                }
            }
            '<' => {
                if self.matches('=') {
                    self.add_token(TokenKind::LessEqual);
                } else {
                    self.add_token(TokenKind::Less);
                }
            }
            '>' => {
                if self.matches('=') {
                    self.add_token(TokenKind::GreaterEqual);
                } else {
                    self.add_token(TokenKind::Greater);
                }
            }
            '&' => {
                if self.matches('&') {
                    self.add_token(TokenKind::AmpAmp);
                } else {
                    self.add_token(TokenKind::Amp);
                }
            }
            '|' => {
                if self.matches('|') {
                    self.add_token(TokenKind::PipePipe);
                } else {
                    self.add_token(TokenKind::Pipe);
                }
            }
            '/' => {
                if self.matches('/') {
                    self.skip_line_comment();
                } else if self.matches('*') {
                    self.skip_block_comment()?;
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '"' | '\'' => self.string(c)?,
            '$' => self.global_identifier()?,
            '.' if self.peek().is_ascii_digit() => self.number()?,
            ' ' | '\r' | '\t' | '\n' => {}
            d if d.is_ascii_digit() => self.number()?,
            a if is_ident_start(a) => self.identifier(),
            _ => {
                return Err(LexError::new(
                    format!("unexpected character '{}'", c),
                    self.token_line,
                    self.token_column,
                ))
            }
        }

        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<(), LexError> {
        let mut value = String::new();
        let mut closed = false;

        while !self.is_at_end() {
            let c = self.advance();
            if c == quote {
                closed = true;
                break;
            }
            if c == '\\' {
                if self.is_at_end() {
                    break;
                }
                match self.advance() {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    other => value.push(other),
                }
                continue;
            }
            value.push(c);
        }

        if !closed {
            return Err(LexError::new(
                "unterminated string literal",
                self.token_line,
                self.token_column,
            ));
        }

        self.add_token(TokenKind::String(value));
        Ok(())
    }

    fn number(&mut self) -> Result<(), LexError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let sign_offset = usize::from(matches!(self.peek_next(), '+' | '-'));
            if self.peek_at(1 + sign_offset).is_ascii_digit() {
                self.advance();
                if sign_offset == 1 {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let lexeme = self.current_lexeme();
        let value = lexeme.parse::<f64>().map_err(|_| {
            LexError::new(
                format!("invalid numeric literal '{}'", lexeme),
                self.token_line,
                self.token_column,
            )
        })?;
        self.add_token(TokenKind::Number(value));
        Ok(())
    }

    fn identifier(&mut self) {
        while is_ident_continue(self.peek()) {
            self.advance();
        }

        let lexeme = self.current_lexeme();
        let kind = match lexeme.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier(lexeme.clone()),
        };

        self.add_token(kind);
    }

    fn global_identifier(&mut self) -> Result<(), LexError> {
        if !is_ident_continue(self.peek()) {
            return Err(LexError::new(
                "expected global variable name after '$'",
                self.token_line,
                self.token_column,
            ));
        }
        while is_ident_continue(self.peek()) {
            self.advance();
        }

        let lexeme = self.current_lexeme();
        self.add_token(TokenKind::GlobalIdentifier(lexeme));
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new(
            "unterminated block comment",
            self.token_line,
            self.token_column,
        ))
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.current_lexeme();
        self.tokens
            .push(Token::new(kind, lexeme, self.token_line, self.token_column));
    }

    fn start_token(&mut self) {
        self.start = self.current;
        self.token_line = self.line;
        self.token_column = self.column;
    }

    fn current_lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars
            .get(self.current + offset)
            .copied()
            .unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '.' || c.is_ascii_alphanumeric()
}
