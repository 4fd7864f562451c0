// ABOUTME: Trampolined evaluator for expanded Scheme expressions

use crate::env::{EnvRef, Environment};
use crate::error::EvalError;
use crate::macros;
use crate::value::{Expr, NativeKind, ProcResult, Procedure};

/// Evaluates `expr` in `env`.
///
/// The `(expr, env)` pair is a loop variable, not a stack frame: special
/// forms and lambda application in tail position re-seat the loop instead
/// of recursing, so a tail-recursive Scheme program runs in constant Rust
/// stack (spec §4.5). Non-tail positions — the operator, non-final lambda
/// arguments, non-final body forms — recurse normally, bounded by source
/// nesting rather than by how many times a loop iterates.
pub fn eval(mut expr: Expr, mut env: EnvRef) -> Result<Expr, EvalError> {
    loop {
        expr = macros::expand(expr, &env)?;

        match &expr {
            Expr::Void
            | Expr::Boolean(_)
            | Expr::Integer(_)
            | Expr::Float(_)
            | Expr::Char(_)
            | Expr::Str(_)
            | Expr::Procedure(_) => return Ok(expr),

            Expr::Symbol(name) => {
                return env
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedSymbol(name.to_string()));
            }

            Expr::List(list) if list.borrow().items.is_empty() => return Ok(expr.clone()),

            Expr::List(list) => {
                let items = list.borrow().items.clone();
                let head = eval(items[0].clone(), env.clone())?;
                let args = &items[1..];

                let Expr::Procedure(proc) = &head else {
                    return Err(EvalError::NotApplicable(format!("{head}")));
                };

                match apply(proc, args, &env)? {
                    ProcResult::Value(v) => return Ok(v),
                    ProcResult::TailCall(next_expr, next_env) => {
                        expr = next_expr;
                        env = next_env;
                    }
                }
            }
        }
    }
}

/// Dispatches one call: special forms get their arguments raw, native
/// value procedures and lambdas get them evaluated left to right (spec
/// §4.6). Arity is validated before any parameter binding happens.
fn apply(proc: &std::rc::Rc<Procedure>, args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &**proc {
        Procedure::Native {
            name,
            kind: NativeKind::SpecialForm,
            arity,
            func,
        } => {
            if !arity.accepts(args.len()) {
                return Err(EvalError::arity_error(name, arity.describe(), args.len()));
            }
            func(args, env)
        }

        Procedure::Native {
            name,
            kind: NativeKind::Value,
            arity,
            func,
        } => {
            let evaluated = eval_args(args, env)?;
            if !arity.accepts(evaluated.len()) {
                return Err(EvalError::arity_error(name, arity.describe(), evaluated.len()));
            }
            func(&evaluated, env)
        }

        Procedure::Lambda {
            name,
            params,
            rest,
            body,
            env: closure_env,
        } => {
            let evaluated = eval_args(args, env)?;
            let arity = proc.arity();
            if !arity.accepts(evaluated.len()) {
                let label = name.as_deref().unwrap_or("lambda");
                return Err(EvalError::arity_error(label, arity.describe(), evaluated.len()));
            }

            let call_env = Environment::extend(closure_env);
            for (param, value) in params.iter().zip(evaluated.iter()) {
                call_env.define(param.clone(), value.clone());
            }
            if let Some(rest_name) = rest {
                let rest_args = evaluated[params.len()..].to_vec();
                call_env.define(rest_name.clone(), Expr::new_proper_list(rest_args));
            }

            match body.split_last() {
                None => Ok(ProcResult::Value(Expr::Void)),
                Some((last, init)) => {
                    for form in init {
                        eval(form.clone(), call_env.clone())?;
                    }
                    Ok(ProcResult::TailCall(last.clone(), call_env))
                }
            }
        }
    }
}

fn eval_args(args: &[Expr], env: &EnvRef) -> Result<Vec<Expr>, EvalError> {
    args.iter().map(|a| eval(a.clone(), env.clone())).collect()
}

/// Applies `proc` to already-evaluated `args`, bypassing the re-evaluation
/// `apply()` normally performs on call-site forms. Used by the `apply`
/// builtin (spec §5), which receives its argument list as data, not code.
pub(crate) fn apply_to_values(proc: &std::rc::Rc<Procedure>, args: &[Expr], env: &EnvRef) -> Result<Expr, EvalError> {
    match &**proc {
        Procedure::Native { name, arity, func, .. } => {
            if !arity.accepts(args.len()) {
                return Err(EvalError::arity_error(name, arity.describe(), args.len()));
            }
            match func(args, env)? {
                ProcResult::Value(v) => Ok(v),
                ProcResult::TailCall(next_expr, next_env) => eval(next_expr, next_env),
            }
        }
        Procedure::Lambda {
            name,
            params,
            rest,
            body,
            env: closure_env,
        } => {
            let arity = proc.arity();
            if !arity.accepts(args.len()) {
                let label = name.as_deref().unwrap_or("lambda");
                return Err(EvalError::arity_error(label, arity.describe(), args.len()));
            }

            let call_env = Environment::extend(closure_env);
            for (param, value) in params.iter().zip(args.iter()) {
                call_env.define(param.clone(), value.clone());
            }
            if let Some(rest_name) = rest {
                let rest_args = args[params.len()..].to_vec();
                call_env.define(rest_name.clone(), Expr::new_proper_list(rest_args));
            }

            match body.split_last() {
                None => Ok(Expr::Void),
                Some((last, init)) => {
                    for form in init {
                        eval(form.clone(), call_env.clone())?;
                    }
                    eval(last.clone(), call_env)
                }
            }
        }
    }
}
