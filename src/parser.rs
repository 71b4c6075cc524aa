// ABOUTME: Recursive-descent, precedence-climbing parser over a token sequence

use crate::ast::{AssignTarget, BinaryOp, Expr, Stmt, UnaryOp};
use crate::error::{ParseError, Position};
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_position(&self) -> Position {
        self.peek().position
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it matches `kind`, else records a
    /// diagnostic and returns `None` without advancing.
    fn expect(&mut self, kind: TokenKind, context: &str) -> Option<Token> {
        if self.check(&kind) {
            Some(self.advance())
        } else {
            let position = self.peek_position();
            self.errors.push(ParseError::UnexpectedToken {
                expected: format!("{} ({})", kind.describe(), context),
                found: self.peek().kind.describe(),
                position,
            });
            None
        }
    }

    /// Advances past the offending token(s) to the next `;`, `}`, or the
    /// start of the next statement, so the next statement can be attempted.
    /// A `;` terminator is consumed; a `}` or a statement-starting keyword is
    /// left in place for the caller to parse. Without the statement-keyword
    /// check, a missing `;` between two statements would swallow the entire
    /// next statement while scanning for the following `;`.
    fn synchronize(&mut self) {
        while !self.is_eof() {
            if matches!(self.peek().kind, TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if matches!(
                self.peek().kind,
                TokenKind::RBrace
                    | TokenKind::Var
                    | TokenKind::If
                    | TokenKind::Return
                    | TokenKind::Fn
            ) {
                return;
            }
            self.advance();
        }
    }

    fn parse_program(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        stmts
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match &self.peek().kind {
            TokenKind::Var => self.parse_var_decl(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::LBrace if !self.looks_like_object_literal() => {
                Some(Stmt::Block(self.parse_block()?))
            }
            _ => self.parse_expr_statement(),
        }
    }

    /// Disambiguates a leading `{` in statement position: an object literal
    /// (`{ x, y: 1 }`) and a bare block (`{ var x = 1; }`) both start with
    /// `{`, but only an object literal's first identifier is immediately
    /// followed by `:`, `,`, or `}`. An empty `{}` is treated as a block —
    /// an empty object literal in statement position has no observable
    /// effect either way, and plain `{}` reads more naturally as a no-op
    /// scope than as a discarded literal.
    fn looks_like_object_literal(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(TokenKind::Identifier(_))
        ) && matches!(
            self.tokens.get(self.pos + 2).map(|t| &t.kind),
            Some(TokenKind::Colon) | Some(TokenKind::Comma) | Some(TokenKind::RBrace)
        )
    }

    fn parse_var_decl(&mut self) -> Option<Stmt> {
        self.advance(); // `var`
        let name = self.parse_identifier_name("variable name")?;
        self.expect(TokenKind::Equal, "variable initializer")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "end of `var` statement")?;
        Some(Stmt::VarDecl { name, value })
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        self.advance(); // `return`
        if self.matches(&TokenKind::Semicolon) {
            return Some(Stmt::Return(None));
        }
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "end of `return` statement")?;
        Some(Stmt::Return(Some(value)))
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let mut branches = Vec::new();

        self.advance(); // `if`
        let cond = self.parse_expression()?;
        let body = self.parse_block()?;
        branches.push((cond, body));

        loop {
            if self.matches(&TokenKind::Elif) {
                let cond = self.parse_expression()?;
                let body = self.parse_block()?;
                branches.push((cond, body));
            } else {
                break;
            }
        }

        let else_branch = if self.matches(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Some(Stmt::If { branches, else_branch })
    }

    fn parse_block(&mut self) -> Option<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "block start")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        self.expect(TokenKind::RBrace, "block end")?;
        Some(stmts)
    }

    fn parse_expr_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "end of expression statement")?;
        Some(Stmt::Expr(expr))
    }

    fn parse_identifier_name(&mut self, context: &str) -> Option<String> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => {
                let position = self.peek_position();
                self.errors.push(ParseError::UnexpectedToken {
                    expected: format!("an identifier ({})", context),
                    found: self.peek().kind.describe(),
                    position,
                });
                None
            }
        }
    }

    // ===== Expressions: precedence climbing, lowest to highest =====
    //
    // assignment (1) -> or (2) -> and (3) -> equality (4) -> relational (5)
    // -> additive (6) -> multiplicative (7) -> unary (8) -> postfix (9)
    // -> primary (10)

    fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Option<Expr> {
        let position = self.peek_position();
        let expr = self.parse_or()?;

        if self.matches(&TokenKind::Equal) {
            let value = self.parse_assignment()?;
            let target = match expr_to_assign_target(expr) {
                Some(target) => target,
                None => {
                    self.errors
                        .push(ParseError::InvalidAssignmentTarget { position });
                    return None;
                }
            };
            return Some(Expr::Assign {
                target,
                value: Box::new(value),
            });
        }

        Some(expr)
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.matches(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.matches(&TokenKind::And) {
            let right = self.parse_equality()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::EqualEqual => BinaryOp::Equal,
                TokenKind::BangEqual => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::Greater => BinaryOp::Greater,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match &self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Some(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match &self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.parse_identifier_name("field name")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "end of subscript")?;
                    expr = Expr::Subscript {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_call_args(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "end of argument list")?;
        Some(args)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let position = self.peek_position();
        match self.peek().kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Some(Expr::Integer(n))
            }
            TokenKind::Float(n) => {
                self.advance();
                Some(Expr::Float(n))
            }
            TokenKind::Str(bytes) => {
                self.advance();
                Some(Expr::Str(bytes))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Boolean(false))
            }
            TokenKind::Nil => {
                self.advance();
                Some(Expr::Null)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr::Identifier(name))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "closing parenthesis")?;
                Some(expr)
            }
            TokenKind::Fn => self.parse_function_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            _ => {
                self.errors.push(ParseError::UnexpectedToken {
                    expected: "an expression".to_string(),
                    found: self.peek().kind.describe(),
                    position,
                });
                None
            }
        }
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        self.advance(); // `fn`
        self.expect(TokenKind::LParen, "parameter list")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_identifier_name("parameter name")?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "end of parameter list")?;
        let body = self.parse_block()?;
        Some(Expr::FunctionLiteral { params, body })
    }

    fn parse_object_literal(&mut self) -> Option<Expr> {
        self.advance(); // `{`
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                if self.check(&TokenKind::RBrace) {
                    break; // trailing comma
                }
                let name = self.parse_identifier_name("property name")?;
                let value = if self.matches(&TokenKind::Colon) {
                    self.parse_expression()?
                } else {
                    Expr::Identifier(name.clone())
                };
                entries.push((name, value));
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "end of object literal")?;
        Some(Expr::ObjectLiteral { entries })
    }
}

fn expr_to_assign_target(expr: Expr) -> Option<AssignTarget> {
    match expr {
        Expr::Identifier(name) => Some(AssignTarget::Identifier(name)),
        Expr::Member { object, field } => Some(AssignTarget::Member { object, field }),
        Expr::Subscript { object, index } => Some(AssignTarget::Subscript { object, index }),
        _ => None,
    }
}

/// Parses a token sequence (as produced by [`crate::lexer::lex`]) into a
/// statement list plus any diagnostics encountered. Always returns a
/// (possibly partial) AST — parse errors never abort the whole pass.
pub fn parse(tokens: Vec<Token>) -> (Vec<Stmt>, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let stmts = parser.parse_program();
    (stmts, parser.errors)
}
