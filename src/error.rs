// ABOUTME: Diagnostic types for the lex, parse, and evaluation phases

use crate::value::Value;
use thiserror::Error;

/// A 1-indexed source position, used for lex and parse diagnostics only.
///
/// Runtime diagnostics deliberately do not carry one: AST nodes are
/// immutable once constructed and don't remember which tokens produced
/// them, so there is nothing to report past parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected byte {byte:#04x} ({position})")]
    UnexpectedByte { byte: u8, position: Position },

    #[error("unterminated string literal ({position})")]
    UnterminatedString { position: Position },

    #[error("malformed number literal ({position})")]
    MalformedNumber { position: Position },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, found {found} ({position})")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("invalid assignment target ({position})")]
    InvalidAssignmentTarget { position: Position },
}

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch error with an operation label, expected type, and actual type
    #[error("{operation}: expected {expected}, got {actual}")]
    TypeMismatch {
        operation: String,
        expected: String,
        actual: String,
    },

    /// Arity error with function name, expected count, and actual count
    #[error("{function}: expected {expected} argument{}, got {actual}", if expected == "1" { "" } else { "s" })]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("variable `{0}` already declared in this scope")]
    Redeclaration(String),

    #[error("value is not callable")]
    NotCallable,

    #[error("field `{0}` not present")]
    FieldNotPresent(String),

    #[error("index {index} out of range for string of length {length}")]
    IndexOutOfRange { index: String, length: usize },

    #[error("byte value {0} out of range, expected 0-255")]
    ByteOutOfRange(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("return outside of a function")]
    ReturnOutsideFunction,

    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    #[error("panic: {0}")]
    Panic(String),
}

impl EvalError {
    /// Create a type mismatch error with full context
    pub fn type_error(operation: &str, expected: &str, actual: &Value) -> Self {
        EvalError::TypeMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    /// Create an arity error with expected and actual counts
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}

/// Renders any phase's diagnostic in the single-line `error: ...` format
/// required of all user-visible output.
pub fn format_diagnostic(message: impl std::fmt::Display) -> String {
    format!("error: {}", message)
}
