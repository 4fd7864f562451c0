// ABOUTME: Error types for parsing and evaluation failures

use crate::value::Expr;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ZERO: &str = "0";
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch error with function name, expected type, actual type, and position.
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count/range, and actual count.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Runtime error with function context.
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("Unbound symbol in assignment: {0}")]
    UnboundAssignment(String),

    #[error("Value is not applicable: {0}")]
    NotApplicable(String),

    #[error("Macro expansion error: {0}")]
    MacroExpansion(String),

    #[error("Improper form: {0}")]
    ImproperForm(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Raised by the `error` builtin (spec §6's error taxonomy is host-signaled,
    /// not just evaluator-internal) and catchable by host code via `Engine::eval`.
    #[error("{0}")]
    UserError(String),
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &Expr, position: usize) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
