// ABOUTME: Type predicates and core value-identity builtins: boolean? integer? float?
// ABOUTME: number? string? symbol? char? pair? null? procedure? zero? eq? eqv? equal? not

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};

fn predicate(f: impl Fn(&Expr) -> bool) -> impl Fn(&[Expr], &EnvRef) -> Result<ProcResult, EvalError> {
    move |args, _env| ProcResult::value(Expr::Boolean(f(&args[0])))
}

fn not(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::Boolean(!args[0].is_truthy()))
}

fn eq_p(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::Boolean(args[0].eqv(&args[1])))
}

fn eqv_p(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::Boolean(args[0].eqv(&args[1])))
}

fn equal_p(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::Boolean(args[0].equal(&args[1])))
}

fn zero_p(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let is_zero = match &args[0] {
        Expr::Integer(n) => *n == 0,
        Expr::Float(n) => *n == 0.0,
        other => return Err(EvalError::type_error("zero?", "number", other, 0)),
    };
    ProcResult::value(Expr::Boolean(is_zero))
}

pub fn install(env: &EnvRef) {
    def(env, "boolean?", NativeKind::Value, Arity::Exact(1), predicate(|e| matches!(e, Expr::Boolean(_))));
    def(env, "integer?", NativeKind::Value, Arity::Exact(1), predicate(|e| matches!(e, Expr::Integer(_))));
    def(env, "float?", NativeKind::Value, Arity::Exact(1), predicate(|e| matches!(e, Expr::Float(_))));
    def(env, "number?", NativeKind::Value, Arity::Exact(1), predicate(|e| e.as_number().is_some()));
    def(env, "string?", NativeKind::Value, Arity::Exact(1), predicate(Expr::is_string));
    def(env, "symbol?", NativeKind::Value, Arity::Exact(1), predicate(Expr::is_symbol));
    def(env, "char?", NativeKind::Value, Arity::Exact(1), predicate(|e| matches!(e, Expr::Char(_))));
    def(env, "pair?", NativeKind::Value, Arity::Exact(1), predicate(|e| matches!(e, Expr::List(l) if !l.borrow().items.is_empty())));
    def(env, "null?", NativeKind::Value, Arity::Exact(1), predicate(Expr::is_nil));
    def(env, "list?", NativeKind::Value, Arity::Exact(1), predicate(Expr::is_proper_list));
    def(env, "procedure?", NativeKind::Value, Arity::Exact(1), predicate(Expr::is_procedure));
    def(env, "zero?", NativeKind::Value, Arity::Exact(1), zero_p);
    def(env, "not", NativeKind::Value, Arity::Exact(1), not);
    def(env, "eq?", NativeKind::Value, Arity::Exact(2), eq_p);
    def(env, "eqv?", NativeKind::Value, Arity::Exact(2), eqv_p);
    def(env, "equal?", NativeKind::Value, Arity::Exact(2), equal_p);
}
