// ABOUTME: Macro expansion and quasiquote evaluation

use crate::env::{EnvRef, Environment};
use crate::error::EvalError;
use crate::eval;
use crate::value::{Expr, ListData, Procedure, Tail};
use std::cell::RefCell;
use std::rc::Rc;

/// Repeatedly expands `expr` while its head position names a macro in
/// `env`'s macro namespace, until the head is no longer a macro name
/// (spec §4.4: "the result replaces the original form and is itself
/// re-expanded").
pub fn expand(expr: Expr, env: &EnvRef) -> Result<Expr, EvalError> {
    let Expr::List(list) = &expr else {
        return Ok(expr);
    };
    let items = list.borrow().items.clone();
    let Some(head) = items.first() else {
        return Ok(expr);
    };
    let Some(name) = head.as_symbol() else {
        return Ok(expr);
    };
    let Some(transformer) = env.get_macro(name) else {
        return Ok(expr);
    };
    let Expr::Procedure(proc) = &transformer else {
        return Err(EvalError::MacroExpansion(format!(
            "{name}: macro transformer is not a procedure"
        )));
    };

    let expanded = apply_transformer(name, proc, &items[1..])?;
    expand(expanded, env)
}

/// Calls a macro transformer with its raw, unevaluated argument forms
/// (spec §4.4) and runs its body through the full evaluator — this is
/// what lets a transformer body use `quasiquote`, `let`, `gensym`, and so
/// on to build its expansion.
fn apply_transformer(name: &str, proc: &Rc<Procedure>, raw_args: &[Expr]) -> Result<Expr, EvalError> {
    let Procedure::Lambda {
        params,
        rest,
        body,
        env: captured_env,
        ..
    } = &**proc
    else {
        return Err(EvalError::MacroExpansion(format!(
            "{name}: macro transformer must be an ordinary lambda"
        )));
    };

    let arity = proc.arity();
    if !arity.accepts(raw_args.len()) {
        return Err(EvalError::arity_error(name, arity.describe(), raw_args.len()));
    }

    let call_env = Environment::extend(captured_env);
    for (param, arg) in params.iter().zip(raw_args.iter()) {
        call_env.define(param.clone(), arg.clone());
    }
    if let Some(rest_name) = rest {
        let rest_args = raw_args[params.len()..].to_vec();
        call_env.define(rest_name.clone(), Expr::new_proper_list(rest_args));
    }

    let mut result = Expr::Void;
    for form in body {
        result = eval::eval(form.clone(), call_env.clone())?;
    }
    Ok(result)
}

/// Evaluates a quasiquoted template. `depth` tracks quasiquote nesting:
/// `unquote`/`unquote-splicing` only fire at `depth == 1`; nested
/// `quasiquote` increases depth, matching `unquote` decreases it back
/// down without evaluating (spec §4.4/§9).
pub fn quasiquote(expr: &Expr, depth: usize, env: &EnvRef) -> Result<Expr, EvalError> {
    let Expr::List(list) = expr else {
        return Ok(expr.clone());
    };
    let (items, tail) = {
        let data = list.borrow();
        (data.items.clone(), data.tail.clone())
    };
    if items.is_empty() {
        return Ok(expr.clone());
    }

    if let Some(head) = items[0].as_symbol() {
        if head == "unquote" {
            if items.len() != 2 {
                return Err(EvalError::runtime_error("unquote", "expected 1 argument"));
            }
            return if depth == 1 {
                eval::eval(items[1].clone(), env.clone())
            } else {
                let inner = quasiquote(&items[1], depth - 1, env)?;
                Ok(Expr::new_proper_list(vec![Expr::symbol("unquote"), inner]))
            };
        }
        if head == "quasiquote" {
            if items.len() != 2 {
                return Err(EvalError::runtime_error("quasiquote", "expected 1 argument"));
            }
            let inner = quasiquote(&items[1], depth + 1, env)?;
            return Ok(Expr::new_proper_list(vec![Expr::symbol("quasiquote"), inner]));
        }
    }

    let mut new_items = Vec::with_capacity(items.len());
    for item in &items {
        if depth == 1 {
            if let Some(spliced) = try_splice(item, env)? {
                new_items.extend(spliced);
                continue;
            }
        }
        new_items.push(quasiquote(item, depth, env)?);
    }

    let new_tail = match tail {
        Tail::Proper => Tail::Proper,
        Tail::Improper(t) => Tail::Improper(Box::new(quasiquote(&t, depth, env)?)),
    };

    Ok(Expr::List(Rc::new(RefCell::new(ListData {
        items: new_items,
        tail: new_tail,
    }))))
}

/// If `item` is `(unquote-splicing expr)`, evaluates `expr` and returns its
/// elements to be spliced into the enclosing list. Returns `None` for any
/// other form, so the caller falls back to plain recursive quasiquoting.
fn try_splice(item: &Expr, env: &EnvRef) -> Result<Option<Vec<Expr>>, EvalError> {
    let Expr::List(inner) = item else {
        return Ok(None);
    };
    let inner_items = inner.borrow().items.clone();
    let Some(head) = inner_items.first().and_then(|e| e.as_symbol()) else {
        return Ok(None);
    };
    if head != "unquote-splicing" {
        return Ok(None);
    }
    if inner_items.len() != 2 {
        return Err(EvalError::runtime_error("unquote-splicing", "expected 1 argument"));
    }
    let spliced = eval::eval(inner_items[1].clone(), env.clone())?;
    match spliced.as_list_items() {
        Some(elems) => Ok(Some(elems)),
        None => Err(EvalError::type_error("unquote-splicing", "list", &spliced, 1)),
    }
}
