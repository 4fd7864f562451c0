// ABOUTME: List/pair builtins — cons, car, cdr, set-car!, set-cdr!, list
// ABOUTME: Lists are a shared mutable handle (spec §3/§4.1), not classical pair cells

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, ListData, NativeKind, ProcResult, Tail};
use std::cell::RefCell;
use std::rc::Rc;

fn require_list<'a>(e: &'a Expr, function: &str, position: usize) -> Result<&'a Rc<RefCell<ListData>>, EvalError> {
    match e {
        Expr::List(l) => Ok(l),
        other => Err(EvalError::type_error(function, "list", other, position)),
    }
}

/// `(cons x y)`: if `y` is a list, `x` is prepended to it; otherwise the
/// result is a one-element list whose dotted tail is `y` (spec §4.1).
fn cons(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let result = match &args[1] {
        Expr::List(l) => {
            let data = l.borrow();
            let mut items = Vec::with_capacity(data.items.len() + 1);
            items.push(args[0].clone());
            items.extend(data.items.iter().cloned());
            Expr::List(Rc::new(RefCell::new(ListData {
                items,
                tail: data.tail.clone(),
            })))
        }
        other => Expr::new_dotted_list(vec![args[0].clone()], other.clone()),
    };
    ProcResult::value(result)
}

/// `car` of a one-element list is its first item regardless of proper/dotted
/// tail; `car` of an empty list is a type error (spec's Open Questions: the
/// `caar`…`cddddr` prelude family relies on this failing loudly).
fn car(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let list = require_list(&args[0], "car", 0)?;
    let data = list.borrow();
    match data.items.first() {
        Some(head) => ProcResult::value(head.clone()),
        None => Err(EvalError::runtime_error("car", "cannot take car of an empty list")),
    }
}

/// `cdr` of a one-element proper list is `'()`; `cdr` of a one-element
/// dotted list is its tail value (spec §4.1).
fn cdr(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let list = require_list(&args[0], "cdr", 0)?;
    let data = list.borrow();
    if data.items.is_empty() {
        return Err(EvalError::runtime_error("cdr", "cannot take cdr of an empty list"));
    }
    if data.items.len() == 1 {
        return ProcResult::value(match &data.tail {
            Tail::Proper => Expr::nil(),
            Tail::Improper(t) => (**t).clone(),
        });
    }
    ProcResult::value(Expr::List(Rc::new(RefCell::new(ListData {
        items: data.items[1..].to_vec(),
        tail: data.tail.clone(),
    }))))
}

fn set_car(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let list = require_list(&args[0], "set-car!", 0)?;
    let mut data = list.borrow_mut();
    if data.items.is_empty() {
        return Err(EvalError::runtime_error("set-car!", "cannot set-car! of an empty list"));
    }
    data.items[0] = args[1].clone();
    ProcResult::value(Expr::Void)
}

fn set_cdr(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let list = require_list(&args[0], "set-cdr!", 0)?;
    let mut data = list.borrow_mut();
    if data.items.is_empty() {
        return Err(EvalError::runtime_error("set-cdr!", "cannot set-cdr! of an empty list"));
    }
    data.items.truncate(1);
    match &args[1] {
        Expr::List(new_tail) => {
            let new_tail = new_tail.borrow();
            data.items.extend(new_tail.items.iter().cloned());
            data.tail = new_tail.tail.clone();
        }
        other => data.tail = Tail::Improper(Box::new(other.clone())),
    }
    ProcResult::value(Expr::Void)
}

fn list(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(Expr::new_proper_list(args.to_vec()))
}

pub fn install(env: &EnvRef) {
    def(env, "cons", NativeKind::Value, Arity::Exact(2), cons);
    def(env, "car", NativeKind::Value, Arity::Exact(1), car);
    def(env, "cdr", NativeKind::Value, Arity::Exact(1), cdr);
    def(env, "set-car!", NativeKind::Value, Arity::Exact(2), set_car);
    def(env, "set-cdr!", NativeKind::Value, Arity::Exact(2), set_cdr);
    def(env, "list", NativeKind::Value, Arity::AtLeast(0), list);
}
