use crate::lexer::token::TokenKind;

use super::ast::{AssignOp, BinaryOp, Expr, UnaryOp};
use super::{ParseError, Parser};

type Level = fn(&mut Parser) -> Result<Expr, ParseError>;

impl Parser {
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.logic_or()?;

        let op = if self.matches_symbol(TokenKind::Equal) {
            AssignOp::Assign
        } else if self.matches_symbol(TokenKind::PlusEqual) {
            AssignOp::AddAssign
        } else if self.matches_symbol(TokenKind::MinusEqual) {
            AssignOp::SubtractAssign
        } else {
            return Ok(target);
        };

        let value = self.assignment()?;
        Ok(Expr::Assign {
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::PipePipe, BinaryOp::LogicalOr),
                (TokenKind::Pipe, BinaryOp::Or),
            ],
            Parser::logic_and,
        )
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::AmpAmp, BinaryOp::LogicalAnd),
                (TokenKind::Amp, BinaryOp::And),
            ],
            Parser::equality,
        )
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::EqualEqual, BinaryOp::Equal),
                (TokenKind::BangEqual, BinaryOp::NotEqual),
            ],
            Parser::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::LessEqual, BinaryOp::LessEqual),
            ],
            Parser::term,
        )
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Subtract),
            ],
            Parser::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Multiply),
                (TokenKind::Slash, BinaryOp::Divide),
            ],
            Parser::power,
        )
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.unary()?;
        if self.matches_symbol(TokenKind::Caret) {
            let exponent = self.power()?;
            return Ok(Expr::Binary {
                lhs: Box::new(base),
                op: BinaryOp::Power,
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        next: Level,
    ) -> Result<Expr, ParseError> {
        let mut expr = next(self)?;

        loop {
            let op = operators
                .iter()
                .find(|(kind, _)| self.check_kind(kind))
                .map(|(_, op)| *op);

            let Some(op) = op else { break };
            self.advance();
            let rhs = next(self)?;
            expr = Expr::Binary {
                lhs: Box::new(expr),
                op,
                rhs: Box::new(rhs),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let prefix = self.matches_any(&[
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ]);

        let Some(kind) = prefix else {
            return self.postfix();
        };

        let op = match kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negative,
            TokenKind::PlusPlus => UnaryOp::PreIncrement,
            _ => UnaryOp::PreDecrement,
        };
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self.matches_symbol(TokenKind::LeftBracket) {
                let key = self.expression()?;
                self.consume_symbol(TokenKind::RightBracket, "expected ']' after index expression")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    key: Box::new(key),
                };
                continue;
            }

            if self.matches_symbol(TokenKind::PlusPlus) {
                expr = Expr::Unary {
                    op: UnaryOp::PostIncrement,
                    operand: Box::new(expr),
                };
                continue;
            }

            if self.matches_symbol(TokenKind::MinusMinus) {
                expr = Expr::Unary {
                    op: UnaryOp::PostDecrement,
                    operand: Box::new(expr),
                };
                continue;
            }

            break;
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::NumericLiteral(value))
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::StringLiteral(value))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BooleanLiteral(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BooleanLiteral(false))
            }
            TokenKind::GlobalIdentifier(name) => {
                self.advance();
                Ok(Expr::GlobalIdentifier(name))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.matches_symbol(TokenKind::LeftParen) {
                    let args = self.call_arguments()?;
                    return Ok(Expr::Call { name, args });
                }
                Ok(Expr::Identifier(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_symbol(TokenKind::RightParen, "expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::LeftBrace => self.array_literal(),
            _ => Err(ParseError::new("expected expression", self.peek())),
        }
    }

    fn call_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check_kind(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches_symbol(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume_symbol(TokenKind::RightParen, "expected ')' after arguments")?;
        Ok(args)
    }

    fn array_literal(&mut self) -> Result<Expr, ParseError> {
        self.consume_symbol(TokenKind::LeftBrace, "expected '{'")?;
        let mut items = Vec::new();
        if !self.check_kind(&TokenKind::RightBrace) {
            loop {
                items.push(self.expression()?);
                if !self.matches_symbol(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume_symbol(TokenKind::RightBrace, "expected '}' after array literal")?;
        Ok(Expr::ArrayLiteral(items))
    }
}
