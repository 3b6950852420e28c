use crate::lexer::token::{Token, TokenKind};

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::{ParseError, Parser};

impl Parser {
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logical_and()?;

        while self.matches(TokenKind::Or) {
            let line = self.previous().line;
            let right = self.logical_and()?;
            expr = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;

        while self.matches(TokenKind::And) {
            let line = self.previous().line;
            let right = self.equality()?;
            expr = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;

        loop {
            let op = if self.matches(TokenKind::EqualEqual) {
                Some(BinaryOp::Equal)
            } else if self.matches(TokenKind::BangEqual) {
                Some(BinaryOp::NotEqual)
            } else {
                None
            };

            let Some(op) = op else { break };
            let line = self.previous().line;
            let right = self.comparison()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;

        loop {
            let op = if self.matches(TokenKind::Less) {
                Some(BinaryOp::Less)
            } else if self.matches(TokenKind::LessEqual) {
                Some(BinaryOp::LessEqual)
            } else if self.matches(TokenKind::Greater) {
                Some(BinaryOp::Greater)
            } else if self.matches(TokenKind::GreaterEqual) {
                Some(BinaryOp::GreaterEqual)
            } else {
                None
            };

            let Some(op) = op else { break };
            let line = self.previous().line;
            let right = self.term()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;

        loop {
            let op = if self.matches(TokenKind::Plus) {
                Some(BinaryOp::Add)
            } else if self.matches(TokenKind::Minus) {
                Some(BinaryOp::Subtract)
            } else {
                None
            };

            let Some(op) = op else { break };
            let line = self.previous().line;
            let right = self.factor()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;

        loop {
            let op = if self.matches(TokenKind::Star) {
                Some(BinaryOp::Multiply)
            } else if self.matches(TokenKind::Slash) {
                Some(BinaryOp::Divide)
            } else if self.matches(TokenKind::Percent) {
                Some(BinaryOp::Modulo)
            } else {
                None
            };

            let Some(op) = op else { break };
            let line = self.previous().line;
            let right = self.unary()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::Minus) {
            let line = self.previous().line;
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
                line,
            });
        }

        if self.matches(TokenKind::Not) {
            let line = self.previous().line;
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                line,
            });
        }

        self.primary()
    }

    pub(crate) fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::True)
            || self.matches(TokenKind::False)
            || self.matches(TokenKind::Number)
            || self.matches(TokenKind::Float)
            || self.matches(TokenKind::Str)
        {
            return Ok(Expr::Literal {
                value: self.previous().clone(),
            });
        }

        if self.matches(TokenKind::Identifier) {
            let name = self.previous().clone();

            if self.matches(TokenKind::LeftParen) {
                let args = self.arguments()?;
                return Ok(Expr::Call { callee: name, args });
            }

            // Indexing desugars to a call to the `get` built-in so that
            // every later phase sees only calls.
            if self.matches(TokenKind::LeftBracket) {
                let index = self.expression()?;
                self.consume(TokenKind::RightBracket, "Expected ']' after index")?;
                let callee =
                    Token::new(TokenKind::Identifier, "get".to_string(), name.line, name.column);
                return Ok(Expr::Call {
                    callee,
                    args: vec![Expr::Variable { name }, index],
                });
            }

            return Ok(Expr::Variable { name });
        }

        if self.matches(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
            return Ok(expr);
        }

        if self.matches(TokenKind::LeftBracket) {
            return self.sequence_literal();
        }

        Err(ParseError::new("Expected expression", self.peek()))
    }

    fn sequence_literal(&mut self) -> Result<Expr, ParseError> {
        let line = self.previous().line;
        let mut elements = Vec::new();

        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.matches(TokenKind::Comma) || self.check(TokenKind::RightBracket) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightBracket, "Expected ']' after sequence elements")?;
        Ok(Expr::Sequence { elements, line })
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(TokenKind::Comma) || self.check(TokenKind::RightParen) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after function arguments")?;
        Ok(args)
    }
}
