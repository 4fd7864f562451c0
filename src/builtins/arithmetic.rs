// ABOUTME: Arithmetic builtins — +, -, *, /, quotient, remainder, modulo, abs, min, max
// ABOUTME: Integer arithmetic promotes to Float on any non-integral operand (spec §3)

use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};

/// A numeric operand coerced out of an `Expr`, preserving whether it came
/// from an `Integer` or a `Float` so the result can stay exact when every
/// operand was exact.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(e: &Expr, function: &str, position: usize) -> Result<Num, EvalError> {
        match e {
            Expr::Integer(n) => Ok(Num::Int(*n)),
            Expr::Float(n) => Ok(Num::Float(*n)),
            other => Err(EvalError::type_error(function, "number", other, position)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
        }
    }

    fn to_expr(self) -> Expr {
        match self {
            Num::Int(n) => Expr::Integer(n),
            Num::Float(n) => Expr::Float(n),
        }
    }
}

fn nums(function: &str, args: &[Expr]) -> Result<Vec<Num>, EvalError> {
    args.iter()
        .enumerate()
        .map(|(i, a)| Num::of(a, function, i))
        .collect()
}

/// Folds a pair of exact integers and a pair of floats, promoting to float
/// as soon as either side is inexact.
fn fold2(a: Num, b: Num, int_op: impl Fn(i64, i64) -> i64, float_op: impl Fn(f64, f64) -> f64) -> Num {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Num::Int(int_op(a, b)),
        _ => Num::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

fn add(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let result = nums("+", args)?
        .into_iter()
        .fold(Num::Int(0), |acc, n| fold2(acc, n, |a, b| a + b, |a, b| a + b));
    ProcResult::value(result.to_expr())
}

fn sub(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let nums = nums("-", args)?;
    let result = match nums.split_first() {
        None => Num::Int(0),
        Some((&first, [])) => fold2(Num::Int(0), first, |_, b| -b, |_, b| -b),
        Some((&first, rest)) => rest
            .iter()
            .fold(first, |acc, &n| fold2(acc, n, |a, b| a - b, |a, b| a - b)),
    };
    ProcResult::value(result.to_expr())
}

fn mul(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let result = nums("*", args)?
        .into_iter()
        .fold(Num::Int(1), |acc, n| fold2(acc, n, |a, b| a * b, |a, b| a * b));
    ProcResult::value(result.to_expr())
}

/// Division stays exact only when every operand is an integer and the
/// running result divides evenly; otherwise it promotes to Float, since the
/// value model has no rational type (spec §3).
fn div(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let nums = nums("/", args)?;
    let Some((&first, rest)) = nums.split_first() else {
        return Err(EvalError::arity_error("/", crate::error::ARITY_AT_LEAST_ONE, 0));
    };
    let result = if rest.is_empty() {
        divide_one(Num::Int(1), first)?
    } else {
        let mut acc = first;
        for &n in rest {
            acc = divide_one(acc, n)?;
        }
        acc
    };
    ProcResult::value(result.to_expr())
}

fn divide_one(a: Num, b: Num) -> Result<Num, EvalError> {
    if b.as_f64() == 0.0 {
        return Err(EvalError::runtime_error("/", "division by zero"));
    }
    match (a, b) {
        (Num::Int(a), Num::Int(b)) if a % b == 0 => Ok(Num::Int(a / b)),
        _ => Ok(Num::Float(a.as_f64() / b.as_f64())),
    }
}

fn require_ints(function: &str, args: &[Expr]) -> Result<(i64, i64), EvalError> {
    let a = match &args[0] {
        Expr::Integer(n) => *n,
        other => return Err(EvalError::type_error(function, "integer", other, 0)),
    };
    let b = match &args[1] {
        Expr::Integer(n) => *n,
        other => return Err(EvalError::type_error(function, "integer", other, 1)),
    };
    if b == 0 {
        return Err(EvalError::runtime_error(function, "division by zero"));
    }
    Ok((a, b))
}

fn quotient(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let (a, b) = require_ints("quotient", args)?;
    ProcResult::value(Expr::Integer(a / b))
}

fn remainder(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let (a, b) = require_ints("remainder", args)?;
    ProcResult::value(Expr::Integer(a % b))
}

/// Scheme `modulo`'s result takes the sign of the divisor, unlike Rust's `%`.
fn modulo(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let (a, b) = require_ints("modulo", args)?;
    let r = a % b;
    let r = if r != 0 && (r < 0) != (b < 0) { r + b } else { r };
    ProcResult::value(Expr::Integer(r))
}

fn abs(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match Num::of(&args[0], "abs", 0)? {
        Num::Int(n) => ProcResult::value(Expr::Integer(n.abs())),
        Num::Float(n) => ProcResult::value(Expr::Float(n.abs())),
    }
}

fn min(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    extremum("min", args, |a, b| a.as_f64() <= b.as_f64())
}

fn max(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    extremum("max", args, |a, b| a.as_f64() >= b.as_f64())
}

fn extremum(function: &str, args: &[Expr], keep_left: impl Fn(Num, Num) -> bool) -> Result<ProcResult, EvalError> {
    let nums = nums(function, args)?;
    let Some((&first, rest)) = nums.split_first() else {
        return Err(EvalError::arity_error(function, crate::error::ARITY_AT_LEAST_ONE, 0));
    };
    let any_float = nums.iter().any(|n| matches!(n, Num::Float(_)));
    let winner = rest.iter().fold(first, |acc, &n| if keep_left(acc, n) { acc } else { n });
    let winner = if any_float { Num::Float(winner.as_f64()) } else { winner };
    ProcResult::value(winner.to_expr())
}

pub fn install(env: &EnvRef) {
    use crate::builtins::def;
    def(env, "+", NativeKind::Value, Arity::AtLeast(0), add);
    def(env, "-", NativeKind::Value, Arity::AtLeast(1), sub);
    def(env, "*", NativeKind::Value, Arity::AtLeast(0), mul);
    def(env, "/", NativeKind::Value, Arity::AtLeast(1), div);
    def(env, "quotient", NativeKind::Value, Arity::Exact(2), quotient);
    def(env, "remainder", NativeKind::Value, Arity::Exact(2), remainder);
    def(env, "modulo", NativeKind::Value, Arity::Exact(2), modulo);
    def(env, "abs", NativeKind::Value, Arity::Exact(1), abs);
    def(env, "min", NativeKind::Value, Arity::AtLeast(1), min);
    def(env, "max", NativeKind::Value, Arity::AtLeast(1), max);
}
