// ABOUTME: Control builtins — apply, error, gensym

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};

/// `(apply proc arg1 ... args-list)`: the final argument must be a list,
/// spread onto the end of the call — the rest are passed through as-is.
fn apply(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let Expr::Procedure(proc) = &args[0] else {
        return Err(EvalError::type_error("apply", "procedure", &args[0], 0));
    };
    let (last, leading) = args[1..]
        .split_last()
        .ok_or_else(|| EvalError::arity_error("apply", crate::error::ARITY_AT_LEAST_ONE, args.len()))?;
    let spread = last
        .as_list_items()
        .ok_or_else(|| EvalError::type_error("apply", "list", last, args.len() - 1))?;

    let mut call_args = leading.to_vec();
    call_args.extend(spread);

    let result = crate::eval::apply_to_values(proc, &call_args, env)?;
    ProcResult::value(result)
}

/// `(error message irritant ...)`: raises a `UserError`, formatting any
/// irritants after the message (spec §4.9).
fn error(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let message = args
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Err(EvalError::UserError(message))
}

fn gensym(_args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::Symbol(env.gensym()))
}

/// `(exit)` or `(exit n)`: terminates the whole process immediately (spec
/// §5 — evaluation either returns, errors, or exits the process this way).
/// Not catchable; there is no unwind-and-cleanup step to run first.
fn exit(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let code = match args.first() {
        None => 0,
        Some(Expr::Integer(n)) => *n as i32,
        Some(Expr::Boolean(false)) => 1,
        Some(Expr::Boolean(true)) => 0,
        Some(other) => return Err(EvalError::type_error("exit", "integer", other, 0)),
    };
    std::process::exit(code);
}

pub fn install(env: &EnvRef) {
    def(env, "apply", NativeKind::Value, Arity::AtLeast(2), apply);
    def(env, "error", NativeKind::Value, Arity::AtLeast(1), error);
    def(env, "gensym", NativeKind::Value, Arity::Exact(0), gensym);
    def(env, "exit", NativeKind::Value, Arity::Range(0, 1), exit);
}
