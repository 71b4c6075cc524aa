// ABOUTME: Abstract syntax tree produced by the parser and walked by the evaluator

use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// Left-hand side of an assignment expression. Kept separate from the
/// general `Expr` grammar because not every expression is a valid
/// assignment target — the parser rejects, say, `1 + 2 = 3` at parse time
/// rather than deferring that to evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Identifier(String),
    Member { object: Box<Expr>, field: String },
    Subscript { object: Box<Expr>, index: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Boolean(bool),
    Integer(BigInt),
    Float(f64),
    Str(Vec<u8>),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
    Subscript {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    ObjectLiteral {
        entries: Vec<(String, Expr)>,
    },
    FunctionLiteral {
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    Assign {
        target: AssignTarget,
        value: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    VarDecl {
        name: String,
        value: Expr,
    },
    Block(Vec<Stmt>),
    If {
        /// `(condition, body)` pairs for the leading `if`/`elif` chain, in
        /// source order, followed by an optional trailing `else` body.
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
    },
    Return(Option<Expr>),
}
