// File: src/parser.rs
//
// Pratt parser for the Brio programming language.
// Consumes the lexer's token stream and produces a Program. Parse errors
// are collected rather than aborting so the driver can report them all.

use crate::ast::{BlockStatement, Expr, Program, Stmt};
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::Lparen => Precedence::Call,
        TokenKind::Lbracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub errors: Vec<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, errors: Vec::new() }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.current_is(&TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        Program { statements }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn current_is(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Advances past the expected peek token, or records an error.
    fn expect_peek(&mut self, kind: &TokenKind) -> bool {
        if self.peek_is(kind) {
            self.advance();
            true
        } else {
            let token = self.peek().clone();
            self.errors.push(format!(
                "expected {:?}, got {:?} at {}:{}",
                kind, token.kind, token.line, token.column
            ));
            false
        }
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.current().kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let peek = self.peek().clone();
        let name = match peek.kind {
            TokenKind::Ident(name) => name,
            other => {
                self.errors.push(format!(
                    "expected identifier after let, got {:?} at {}:{}",
                    other, peek.line, peek.column
                ));
                return None;
            }
        };
        self.advance();
        if !self.expect_peek(&TokenKind::Assign) {
            return None;
        }
        self.advance();
        let mut value = self.parse_expression(Precedence::Lowest)?;
        // A named function literal can refer to itself recursively.
        if let Expr::Function { name: fn_name, .. } = &mut value {
            *fn_name = Some(name.clone());
        }
        if self.peek_is(&TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(&TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(&TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::ExprStmt(expr))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while !self.peek_is(&TokenKind::Semicolon) && precedence < precedence_of(&self.peek().kind)
        {
            left = match self.peek().kind {
                TokenKind::Lparen => {
                    self.advance();
                    self.parse_call_expression(left)?
                }
                TokenKind::Lbracket => {
                    self.advance();
                    self.parse_index_expression(left)?
                }
                _ => {
                    self.advance();
                    self.parse_infix_expression(left)?
                }
            };
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => Some(Expr::Ident(name)),
            TokenKind::Int(value) => Some(Expr::Int(value)),
            TokenKind::Str(value) => Some(Expr::Str(value)),
            TokenKind::True => Some(Expr::Bool(true)),
            TokenKind::False => Some(Expr::Bool(false)),
            TokenKind::Bang => self.parse_prefix_expression("!"),
            TokenKind::Minus => self.parse_prefix_expression("-"),
            TokenKind::Lparen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::While => self.parse_while_expression(),
            TokenKind::Fn => self.parse_function_literal(),
            TokenKind::Lbracket => self.parse_array_literal(),
            TokenKind::Lbrace => self.parse_hash_literal(),
            other => {
                self.errors.push(format!(
                    "no prefix parse rule for {:?} at {}:{}",
                    other, token.line, token.column
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, op: &str) -> Option<Expr> {
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix { op: op.to_string(), right: Box::new(right) })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let token = self.current().clone();
        let op = match token.kind {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            other => {
                self.errors.push(format!(
                    "unknown infix operator {:?} at {}:{}",
                    other, token.line, token.column
                ));
                return None;
            }
        };
        let precedence = precedence_of(&token.kind);
        self.advance();
        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix {
            left: Box::new(left),
            op: op.to_string(),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&TokenKind::Rparen) {
            return None;
        }
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        if !self.expect_peek(&TokenKind::Lparen) {
            return None;
        }
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&TokenKind::Rparen) {
            return None;
        }
        if !self.expect_peek(&TokenKind::Lbrace) {
            return None;
        }
        let consequence = self.parse_block_statement();
        let alternative = if self.peek_is(&TokenKind::Else) {
            self.advance();
            if !self.expect_peek(&TokenKind::Lbrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };
        Some(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_while_expression(&mut self) -> Option<Expr> {
        if !self.expect_peek(&TokenKind::Lparen) {
            return None;
        }
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&TokenKind::Rparen) {
            return None;
        }
        if !self.expect_peek(&TokenKind::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expr::While { condition: Box::new(condition), body })
    }

    /// Current token is `{`; consumes through the matching `}`.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.advance();
        while !self.current_is(&TokenKind::Rbrace) && !self.current_is(&TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(&TokenKind::Lparen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(&TokenKind::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expr::Function { name: None, parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_is(&TokenKind::Rparen) {
            self.advance();
            return Some(parameters);
        }
        loop {
            self.advance();
            let token = self.current().clone();
            match token.kind {
                TokenKind::Ident(name) => parameters.push(name),
                other => {
                    self.errors.push(format!(
                        "expected parameter name, got {:?} at {}:{}",
                        other, token.line, token.column
                    ));
                    return None;
                }
            }
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        if !self.expect_peek(&TokenKind::Rparen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expr) -> Option<Expr> {
        let arguments = self.parse_expression_list(&TokenKind::Rparen)?;
        Some(Expr::Call { function: Box::new(function), arguments })
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let elements = self.parse_expression_list(&TokenKind::Rbracket)?;
        Some(Expr::Array(elements))
    }

    /// Current token is the opening delimiter; consumes through `end`.
    fn parse_expression_list(&mut self, end: &TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.advance();
            return Some(list);
        }
        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();
        while !self.peek_is(&TokenKind::Rbrace) {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(&TokenKind::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(&TokenKind::Rbrace) && !self.expect_peek(&TokenKind::Comma) {
                return None;
            }
        }
        self.advance();
        Some(Expr::HashLit(pairs))
    }

    fn parse_index_expression(&mut self, left: Expr) -> Option<Expr> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(&TokenKind::Rbracket) {
            return None;
        }
        Some(Expr::Index { left: Box::new(left), index: Box::new(index) })
    }
}
