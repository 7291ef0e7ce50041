pub mod ast;
mod expr;

use thiserror::Error;

use crate::lexer::token::{Token, TokenKind};
use ast::Program;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        self.skip_statement_breaks();
        while !self.is_at_end() {
            statements.push(self.expression()?);
            if !self.is_at_end() {
                self.consume_symbol(TokenKind::Semicolon, "expected ';' after expression")?;
            }
            self.skip_statement_breaks();
        }

        Ok(Program { statements })
    }

    pub(crate) fn skip_statement_breaks(&mut self) {
        while self.matches_symbol(TokenKind::Semicolon) {}
    }

    pub(crate) fn matches_symbol(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn matches_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let found = kinds.iter().find(|kind| self.check_kind(kind))?.clone();
        self.advance();
        Some(found)
    }

    pub(crate) fn consume_symbol(
        &mut self,
        kind: TokenKind,
        message: &str,
    ) -> Result<(), ParseError> {
        if self.check_kind(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(message, self.peek()))
        }
    }

    pub(crate) fn check_kind(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            return matches!(kind, TokenKind::Eof);
        }

        self.peek_kind().same_kind(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}
