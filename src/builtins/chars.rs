// ABOUTME: Character builtins — char->integer integer->char char-upcase char-downcase

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};

fn char_to_integer(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Char(c) => ProcResult::value(Expr::Integer(*c as i64)),
        other => Err(EvalError::type_error("char->integer", "char", other, 0)),
    }
}

fn integer_to_char(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Integer(n) => {
            let c = u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| EvalError::runtime_error("integer->char", "not a valid character codepoint"))?;
            ProcResult::value(Expr::Char(c))
        }
        other => Err(EvalError::type_error("integer->char", "integer", other, 0)),
    }
}

fn char_upcase(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Char(c) => ProcResult::value(Expr::Char(c.to_ascii_uppercase())),
        other => Err(EvalError::type_error("char-upcase", "char", other, 0)),
    }
}

fn char_downcase(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Char(c) => ProcResult::value(Expr::Char(c.to_ascii_lowercase())),
        other => Err(EvalError::type_error("char-downcase", "char", other, 0)),
    }
}

pub fn install(env: &EnvRef) {
    def(env, "char->integer", NativeKind::Value, Arity::Exact(1), char_to_integer);
    def(env, "integer->char", NativeKind::Value, Arity::Exact(1), integer_to_char);
    def(env, "char-upcase", NativeKind::Value, Arity::Exact(1), char_upcase);
    def(env, "char-downcase", NativeKind::Value, Arity::Exact(1), char_downcase);
}
