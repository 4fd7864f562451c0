// ABOUTME: Numeric comparison builtins — =, <, >, <=, >=

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};

fn number_at(args: &[Expr], function: &str, i: usize) -> Result<f64, EvalError> {
    args[i]
        .as_number()
        .ok_or_else(|| EvalError::type_error(function, "number", &args[i], i))
}

/// Applies `op` pairwise across consecutive arguments, R7RS-style: `(< 1 2 3)`
/// is true iff `1 < 2` and `2 < 3`.
fn chain(function: &'static str, op: impl Fn(f64, f64) -> bool) -> impl Fn(&[Expr], &EnvRef) -> Result<ProcResult, EvalError> {
    move |args, _env| {
        for i in 0..args.len() - 1 {
            let a = number_at(args, function, i)?;
            let b = number_at(args, function, i + 1)?;
            if !op(a, b) {
                return ProcResult::value(Expr::Boolean(false));
            }
        }
        ProcResult::value(Expr::Boolean(true))
    }
}

fn eq(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    for i in 0..args.len() - 1 {
        let a = number_at(args, "=", i)?;
        let b = number_at(args, "=", i + 1)?;
        if a != b {
            return ProcResult::value(Expr::Boolean(false));
        }
    }
    ProcResult::value(Expr::Boolean(true))
}

fn lt(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    chain("<", |a, b| a < b)(args, env)
}

fn gt(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    chain(">", |a, b| a > b)(args, env)
}

fn le(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    chain("<=", |a, b| a <= b)(args, env)
}

fn ge(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    chain(">=", |a, b| a >= b)(args, env)
}

pub fn install(env: &EnvRef) {
    def(env, "=", NativeKind::Value, Arity::AtLeast(1), eq);
    def(env, "<", NativeKind::Value, Arity::AtLeast(1), lt);
    def(env, ">", NativeKind::Value, Arity::AtLeast(1), gt);
    def(env, "<=", NativeKind::Value, Arity::AtLeast(1), le);
    def(env, ">=", NativeKind::Value, Arity::AtLeast(1), ge);
}
