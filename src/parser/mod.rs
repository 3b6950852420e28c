pub mod ast;
mod expr;

use std::error::Error;
use std::fmt;

use crate::lexer::token::{Token, TokenKind};
use ast::{DataType, Expr, FunctionDecl, Param, Program, Stmt};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            line: token.line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.message, self.line)
    }
}

impl Error for ParseError {}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses a whole program. All-or-nothing: the first structural
    /// violation aborts the parse with no partial tree.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut functions = Vec::new();

        while !self.is_at_end() {
            if self.matches(TokenKind::Func) {
                functions.push(self.function_declaration()?);
            } else {
                return Err(ParseError::new("Expected function declaration", self.peek()));
            }
        }

        Ok(Program { functions })
    }

    fn function_declaration(&mut self) -> Result<FunctionDecl, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expected function name")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;
        let params = self.parameters()?;
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;
        self.consume(TokenKind::Arrow, "Expected '->' after function parameters")?;

        if !self.check_type_token() {
            return Err(ParseError::new(
                format!("Expected return type, got: {}", self.peek().lexeme),
                self.peek(),
            ));
        }
        let return_type = data_type_from(self.advance());

        let body = self.block()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.check(TokenKind::RightParen) {
            return Ok(params);
        }

        loop {
            let name = self.consume(TokenKind::Identifier, "Expected parameter name")?;
            self.consume(TokenKind::Colon, "Expected ':' after parameter name")?;

            if !self.check_type_token() {
                return Err(ParseError::new(
                    format!(
                        "Expected parameter type after '{}:', got: {}",
                        name.lexeme,
                        self.peek().lexeme
                    ),
                    self.peek(),
                ));
            }
            let type_token = self.advance().clone();
            let data_type = data_type_from(&type_token);
            if data_type == DataType::Unknown {
                return Err(ParseError::new(
                    format!("Unknown parameter type: '{}'", type_token.lexeme),
                    &type_token,
                ));
            }

            params.push(Param { name, data_type });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.consume(TokenKind::LeftBrace, "Expected '{' before block")?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        self.consume(TokenKind::RightBrace, "Expected '}' after block")?;
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(TokenKind::Let) {
            return self.declaration();
        }
        if self.matches(TokenKind::If) {
            return self.if_statement();
        }
        if self.matches(TokenKind::While) {
            return self.while_statement();
        }
        if self.matches(TokenKind::Return) {
            return self.return_statement();
        }

        if self.check(TokenKind::Identifier) && self.peek().lexeme == "print" {
            return self.print_statement();
        }

        if self.check(TokenKind::Identifier) && self.peek_next_kind() == TokenKind::Equal {
            let name = self.advance().clone();
            return self.assignment(name);
        }

        if self.check(TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expected variable name")?;
        self.consume(TokenKind::Colon, "Expected ':' after variable name")?;

        if !self.check_type_token() {
            return Err(ParseError::new(
                format!(
                    "Expected variable type after '{}:', got: {}",
                    name.lexeme,
                    self.peek().lexeme
                ),
                self.peek(),
            ));
        }
        let data_type = data_type_from(self.advance());

        let initializer = if self.matches(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.matches(TokenKind::Semicolon);
        Ok(Stmt::Declaration {
            name,
            data_type,
            initializer,
        })
    }

    fn assignment(&mut self, name: Token) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::Equal, "Expected '=' after variable name")?;
        let value = self.expression()?;
        self.matches(TokenKind::Semicolon);
        Ok(Stmt::Assignment { name, value })
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.previous().line;
        let condition = self.expression()?;
        let then_branch = self.block()?;
        let else_branch = if self.matches(TokenKind::Else) {
            self.block()?
        } else {
            Vec::new()
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            line,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.previous().line;
        let condition = self.expression()?;
        let body = self.block()?;

        Ok(Stmt::While {
            condition,
            body,
            line,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.previous().line;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        self.matches(TokenKind::Semicolon);
        Ok(Stmt::Return { value, line })
    }

    /// Print arguments are primary expressions only; the list ends at a
    /// statement boundary, another `print`, a following `=`, any token
    /// that cannot start a primary, or a failed primary parse.
    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let callee = self.advance().clone();
        let mut args = Vec::new();

        loop {
            if self.at_statement_boundary() {
                break;
            }

            match self.primary() {
                Ok(arg) => args.push(arg),
                Err(_) => break,
            }

            if self.at_statement_boundary() {
                break;
            }
            if self.check(TokenKind::Identifier) && self.peek().lexeme == "print" {
                break;
            }
            if self.check(TokenKind::Equal) {
                break;
            }
            if !self.check_primary_start() {
                break;
            }
        }

        self.matches(TokenKind::Semicolon);
        Ok(Stmt::Expression(Expr::Call { callee, args }))
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.matches(TokenKind::Semicolon);
        Ok(Stmt::Expression(expr))
    }

    fn at_statement_boundary(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Semicolon
                | TokenKind::RightBrace
                | TokenKind::Func
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Else
                | TokenKind::Eof
        )
    }

    fn check_primary_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier
                | TokenKind::Str
                | TokenKind::Number
                | TokenKind::Float
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
        )
    }

    fn check_type_token(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::IntType
                | TokenKind::FloatType
                | TokenKind::BoolType
                | TokenKind::SequenceType
                | TokenKind::PatternType
                | TokenKind::Identifier
        )
    }

    // Resync scaffold for multi-diagnostic parsing; the all-or-nothing
    // failure model never reaches it.
    #[allow(dead_code)]
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Func
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    pub(crate) fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(ParseError::new(message, self.peek()))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.current + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}

fn data_type_from(token: &Token) -> DataType {
    match token.kind {
        TokenKind::IntType => DataType::Int,
        TokenKind::FloatType => DataType::Float,
        TokenKind::BoolType => DataType::Bool,
        TokenKind::SequenceType => DataType::Sequence,
        TokenKind::PatternType => DataType::Pattern,
        _ => DataType::Unknown,
    }
}
