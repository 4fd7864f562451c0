// ABOUTME: Special form handlers installed as ordinary SpecialForm-kind native
// ABOUTME: procedures in the root environment, dispatched like any other symbol

use crate::env::{EnvRef, Environment};
use crate::error::EvalError;
use crate::eval;
use crate::macros;
use crate::parser;
use crate::value::{Arity, Expr, NativeFn, NativeKind, ProcResult, Procedure, Tail};
use std::rc::Rc;

/// Installs every special form this engine understands into `env` (meant to
/// be the root environment). Each binding is an ordinary `Procedure::Native`
/// with `NativeKind::SpecialForm`, looked up through `env.get` exactly like
/// a user-defined symbol — spec §4.5 models special forms as `Procedure`
/// records with a `kind`, not as a hardcoded dispatch table.
pub fn install(env: &EnvRef) {
    def(env, "quote", NativeKind::SpecialForm, Arity::Exact(1), sf_quote);
    def(env, "if", NativeKind::SpecialForm, Arity::Range(2, 3), sf_if);
    def(env, "define", NativeKind::SpecialForm, Arity::AtLeast(1), sf_define);
    def(env, "set!", NativeKind::SpecialForm, Arity::Exact(2), sf_set);
    def(env, "lambda", NativeKind::SpecialForm, Arity::AtLeast(2), sf_lambda);
    def(env, "let", NativeKind::SpecialForm, Arity::AtLeast(2), sf_let);
    def(env, "let*", NativeKind::SpecialForm, Arity::AtLeast(2), sf_let_star);
    def(env, "letrec", NativeKind::SpecialForm, Arity::AtLeast(2), sf_letrec);
    def(env, "letrec*", NativeKind::SpecialForm, Arity::AtLeast(2), sf_letrec);
    def(env, "begin", NativeKind::SpecialForm, Arity::AtLeast(0), sf_begin);
    def(env, "cond", NativeKind::SpecialForm, Arity::AtLeast(0), sf_cond);
    def(env, "and", NativeKind::SpecialForm, Arity::AtLeast(0), sf_and);
    def(env, "or", NativeKind::SpecialForm, Arity::AtLeast(0), sf_or);
    def(env, "quasiquote", NativeKind::SpecialForm, Arity::Exact(1), sf_quasiquote);
    def(env, "define-macro", NativeKind::SpecialForm, Arity::AtLeast(2), sf_define_macro);
    def(env, "do", NativeKind::SpecialForm, Arity::AtLeast(2), sf_do);
    def(env, "include", NativeKind::Value, Arity::Exact(1), sf_include);
    def(env, "load", NativeKind::Value, Arity::Exact(1), sf_include);
}

fn def(env: &EnvRef, name: &str, kind: NativeKind, arity: Arity, func: NativeFn) {
    env.define(
        name,
        Expr::Procedure(Rc::new(Procedure::Native {
            name: name.into(),
            kind,
            arity,
            func,
        })),
    );
}

fn list_parts(e: &Expr) -> Option<(Vec<Expr>, Tail)> {
    match e {
        Expr::List(l) => {
            let data = l.borrow();
            Some((data.items.clone(), data.tail.clone()))
        }
        _ => None,
    }
}

fn symbol_name(e: &Expr, form: &str) -> Result<Rc<str>, EvalError> {
    e.as_symbol()
        .map(Into::into)
        .ok_or_else(|| EvalError::type_error(form, "symbol", e, 0))
}

/// Splits a lambda-style parameter spec into fixed params plus an optional
/// rest binding: `(a b)`, `(a b . c)`, or a bare `c` (all-rest) per spec §4.1.
fn parse_params(e: &Expr, form: &str) -> Result<(Vec<Rc<str>>, Option<Rc<str>>), EvalError> {
    if let Some(name) = e.as_symbol() {
        return Ok((Vec::new(), Some(name.into())));
    }
    let Some((items, tail)) = list_parts(e) else {
        return Err(EvalError::type_error(form, "parameter list", e, 0));
    };
    let params = items
        .iter()
        .map(|p| symbol_name(p, form))
        .collect::<Result<Vec<_>, _>>()?;
    let rest = match tail {
        Tail::Proper => None,
        Tail::Improper(t) => Some(symbol_name(&t, form)?),
    };
    Ok((params, rest))
}

fn require_list(e: &Expr, form: &str) -> Result<Vec<Expr>, EvalError> {
    match e {
        Expr::List(l) => Ok(l.borrow().items.clone()),
        _ => Err(EvalError::type_error(form, "list", e, 0)),
    }
}

fn sf_quote(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(args[0].clone())
}

fn sf_if(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let cond = eval::eval(args[0].clone(), env.clone())?;
    if cond.is_truthy() {
        Ok(ProcResult::TailCall(args[1].clone(), env.clone()))
    } else if args.len() == 3 {
        Ok(ProcResult::TailCall(args[2].clone(), env.clone()))
    } else {
        ProcResult::value(Expr::Void)
    }
}

fn sf_define(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Symbol(name) => {
            let value = match args.get(1) {
                Some(init) => eval::eval(init.clone(), env.clone())?,
                None => Expr::Void,
            };
            env.define(name.clone(), value);
            ProcResult::value(Expr::Void)
        }
        Expr::List(_) => {
            let (items, tail) = list_parts(&args[0]).expect("matched Expr::List above");
            let Some(name_expr) = items.first() else {
                return Err(EvalError::runtime_error("define", "missing function name"));
            };
            let name = symbol_name(name_expr, "define")?;
            let params = items[1..]
                .iter()
                .map(|p| symbol_name(p, "define"))
                .collect::<Result<Vec<_>, _>>()?;
            let rest = match tail {
                Tail::Proper => None,
                Tail::Improper(t) => Some(symbol_name(&t, "define")?),
            };
            if args.len() < 2 {
                return Err(EvalError::runtime_error("define", "function body is empty"));
            }
            let body = args[1..].to_vec();
            let lambda = Procedure::Lambda {
                name: Some(name.clone()),
                params,
                rest,
                body,
                env: env.clone(),
            };
            env.define(name.clone(), Expr::Procedure(Rc::new(lambda)));
            ProcResult::value(Expr::Void)
        }
        other => Err(EvalError::type_error("define", "symbol or list", other, 0)),
    }
}

fn sf_set(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let name = symbol_name(&args[0], "set!")?;
    let value = eval::eval(args[1].clone(), env.clone())?;
    env.set(&name, value)?;
    ProcResult::value(Expr::Void)
}

fn sf_lambda(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let (params, rest) = parse_params(&args[0], "lambda")?;
    let body = args[1..].to_vec();
    ProcResult::value(Expr::Procedure(Rc::new(Procedure::Lambda {
        name: None,
        params,
        rest,
        body,
        env: env.clone(),
    })))
}

/// `(let ((x v) ...) body...)` and named `(let loop ((x v) ...) body...)`.
fn sf_let(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    if let Some(loop_name) = args[0].as_symbol() {
        let loop_name: Rc<str> = loop_name.into();
        let bindings = require_list(&args[1], "let")?;
        let mut names = Vec::with_capacity(bindings.len());
        let mut inits = Vec::with_capacity(bindings.len());
        for b in &bindings {
            let pair = require_list(b, "let")?;
            if pair.len() != 2 {
                return Err(EvalError::runtime_error("let", "binding must be (name value)"));
            }
            names.push(symbol_name(&pair[0], "let")?);
            inits.push(pair[1].clone());
        }
        let body = args[2..].to_vec();
        if body.is_empty() {
            return Err(EvalError::runtime_error("let", "loop body is empty"));
        }

        let loop_env = Environment::extend(env);
        let lambda = Procedure::Lambda {
            name: Some(loop_name.clone()),
            params: names.clone(),
            rest: None,
            body: body.clone(),
            env: loop_env.clone(),
        };
        loop_env.define(loop_name, Expr::Procedure(Rc::new(lambda)));

        let values = inits
            .iter()
            .map(|i| eval::eval(i.clone(), env.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let call_env = Environment::extend(&loop_env);
        for (name, value) in names.iter().zip(values.iter()) {
            call_env.define(name.clone(), value.clone());
        }
        return tail_in_body(&body, call_env);
    }

    let bindings = require_list(&args[0], "let")?;
    let new_env = Environment::extend(env);
    for b in &bindings {
        let pair = require_list(b, "let")?;
        if pair.len() != 2 {
            return Err(EvalError::runtime_error("let", "binding must be (name value)"));
        }
        let name = symbol_name(&pair[0], "let")?;
        let value = eval::eval(pair[1].clone(), env.clone())?;
        new_env.define(name, value);
    }
    tail_in_body(&args[1..], new_env)
}

/// `(let* ((x v) (y (f x))) body...)` — each binding sees all earlier ones.
fn sf_let_star(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let bindings = require_list(&args[0], "let*")?;
    let new_env = Environment::extend(env);
    for b in &bindings {
        let pair = require_list(b, "let*")?;
        if pair.len() != 2 {
            return Err(EvalError::runtime_error("let*", "binding must be (name value)"));
        }
        let name = symbol_name(&pair[0], "let*")?;
        let value = eval::eval(pair[1].clone(), new_env.clone())?;
        new_env.define(name, value);
    }
    tail_in_body(&args[1..], new_env)
}

/// Shared by `letrec` and `letrec*`: names are pre-bound to `#<void>` so
/// mutually recursive definitions (two functions calling each other) can
/// close over one another before either body has run.
fn sf_letrec(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let bindings = require_list(&args[0], "letrec")?;
    let new_env = Environment::extend(env);
    let mut names = Vec::with_capacity(bindings.len());
    let mut inits = Vec::with_capacity(bindings.len());
    for b in &bindings {
        let pair = require_list(b, "letrec")?;
        if pair.len() != 2 {
            return Err(EvalError::runtime_error("letrec", "binding must be (name value)"));
        }
        let name = symbol_name(&pair[0], "letrec")?;
        new_env.define(name.clone(), Expr::Void);
        names.push(name);
        inits.push(pair[1].clone());
    }
    for (name, init) in names.iter().zip(inits.iter()) {
        let value = eval::eval(init.clone(), new_env.clone())?;
        new_env.define(name.clone(), value);
    }
    tail_in_body(&args[1..], new_env)
}

fn sf_begin(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    tail_in_body(args, env.clone())
}

fn sf_cond(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    for clause in args {
        let parts = require_list(clause, "cond")?;
        let Some((test, body)) = parts.split_first() else {
            return Err(EvalError::runtime_error("cond", "clause must not be empty"));
        };
        if matches!(test.as_symbol(), Some("else")) {
            return tail_in_body(body, env.clone());
        }
        let value = eval::eval(test.clone(), env.clone())?;
        if !value.is_truthy() {
            continue;
        }
        if body.is_empty() {
            return ProcResult::value(value);
        }
        // `(test => proc)`: apply the already-evaluated test value to `proc`
        // in tail position, rather than evaluating `=>` as a symbol (spec §4.5).
        if body.len() == 2 && matches!(body[0].as_symbol(), Some("=>")) {
            let recipient = eval::eval(body[1].clone(), env.clone())?;
            let Expr::Procedure(proc) = &recipient else {
                return Err(EvalError::type_error("cond", "procedure", &recipient, 0));
            };
            let result = crate::eval::apply_to_values(proc, &[value], env)?;
            return ProcResult::value(result);
        }
        return tail_in_body(body, env.clone());
    }
    ProcResult::value(Expr::Void)
}

fn sf_and(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let Some((last, init)) = args.split_last() else {
        return ProcResult::value(Expr::Boolean(true));
    };
    for a in init {
        let value = eval::eval(a.clone(), env.clone())?;
        if !value.is_truthy() {
            return ProcResult::value(value);
        }
    }
    Ok(ProcResult::TailCall(last.clone(), env.clone()))
}

fn sf_or(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let Some((last, init)) = args.split_last() else {
        return ProcResult::value(Expr::Boolean(false));
    };
    for a in init {
        let value = eval::eval(a.clone(), env.clone())?;
        if value.is_truthy() {
            return ProcResult::value(value);
        }
    }
    Ok(ProcResult::TailCall(last.clone(), env.clone()))
}

fn sf_quasiquote(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    ProcResult::value(macros::quasiquote(&args[0], 1, env)?)
}

/// `(define-macro (name . params) body...)` — the name and formal list are
/// written together, the same shorthand `define` uses for procedures (spec
/// §8 scenario 5: `(define-macro (swap! a b) ...)`).
fn sf_define_macro(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let (items, tail) = list_parts(&args[0]).ok_or_else(|| {
        EvalError::type_error("define-macro", "(name . params) list", &args[0], 0)
    })?;
    let Some(name_expr) = items.first() else {
        return Err(EvalError::runtime_error("define-macro", "missing macro name"));
    };
    let name = symbol_name(name_expr, "define-macro")?;
    let params = items[1..]
        .iter()
        .map(|p| symbol_name(p, "define-macro"))
        .collect::<Result<Vec<_>, _>>()?;
    let rest = match tail {
        Tail::Proper => None,
        Tail::Improper(t) => Some(symbol_name(&t, "define-macro")?),
    };
    let body = args[1..].to_vec();
    if body.is_empty() {
        return Err(EvalError::runtime_error("define-macro", "transformer body is empty"));
    }
    let transformer = Procedure::Lambda {
        name: Some(name.clone()),
        params,
        rest,
        body,
        env: env.clone(),
    };
    env.define_macro(name.clone(), Expr::Procedure(Rc::new(transformer)));
    ProcResult::value(Expr::Void)
}

/// `(do ((var init step) ...) (test result...) command...)`. Each pass
/// through the loop rebinds the variables in a fresh frame, so a closure
/// built inside `command...` captures that iteration's values rather than
/// a cell shared across iterations.
fn sf_do(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let specs = require_list(&args[0], "do")?;
    let test_clause = require_list(&args[1], "do")?;
    let Some((test, results)) = test_clause.split_first() else {
        return Err(EvalError::runtime_error("do", "test clause must not be empty"));
    };
    let commands = &args[2..];

    struct Binding {
        name: Rc<str>,
        init: Expr,
        step: Option<Expr>,
    }
    let bindings = specs
        .iter()
        .map(|b| {
            let parts = require_list(b, "do")?;
            if parts.len() < 2 || parts.len() > 3 {
                return Err(EvalError::runtime_error("do", "binding must be (var init [step])"));
            }
            Ok(Binding {
                name: symbol_name(&parts[0], "do")?,
                init: parts[1].clone(),
                step: parts.get(2).cloned(),
            })
        })
        .collect::<Result<Vec<_>, EvalError>>()?;

    let mut frame = Environment::extend(env);
    for b in &bindings {
        let value = eval::eval(b.init.clone(), env.clone())?;
        frame.define(b.name.clone(), value);
    }

    loop {
        if eval::eval(test.clone(), frame.clone())?.is_truthy() {
            if results.is_empty() {
                return ProcResult::value(Expr::Void);
            }
            return tail_in_body(results, frame);
        }
        for cmd in commands {
            eval::eval(cmd.clone(), frame.clone())?;
        }
        let next_frame = Environment::extend(env);
        for b in &bindings {
            let next_value = match &b.step {
                Some(step) => eval::eval(step.clone(), frame.clone())?,
                None => frame.get(&b.name).expect("do variable always bound in its own frame"),
            };
            next_frame.define(b.name.clone(), next_value);
        }
        frame = next_frame;
    }
}

/// `include`/`load`: reads a file relative to the environment's current
/// working directory, parses every top-level form, and evaluates each in
/// order. Both behave identically here — this engine has no separate
/// top-level-vs-textual-insertion distinction (spec §9 leaves the exact
/// split unspecified).
fn sf_include(args: &[Expr], env: &EnvRef) -> Result<ProcResult, EvalError> {
    let Expr::Str(path) = &args[0] else {
        return Err(EvalError::type_error("include", "string", &args[0], 0));
    };
    let full_path = env.cwd().join(&*path.borrow());
    let source = std::fs::read_to_string(&full_path).map_err(|e| {
        EvalError::runtime_error("include", format!("could not read {}: {e}", full_path.display()))
    })?;
    let forms = parser::parse_all(&source).map_err(EvalError::ParseError)?;
    for form in forms {
        eval::eval(form, env.clone())?;
    }
    ProcResult::value(Expr::Void)
}

/// Evaluates `body[..len-1]` for effect and re-seats the trampoline on the
/// last form — the shared tail position every body-bearing form uses.
fn tail_in_body(body: &[Expr], env: EnvRef) -> Result<ProcResult, EvalError> {
    match body.split_last() {
        None => ProcResult::value(Expr::Void),
        Some((last, init)) => {
            for form in init {
                eval::eval(form.clone(), env.clone())?;
            }
            Ok(ProcResult::TailCall(last.clone(), env))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> EnvRef {
        let env = Environment::new();
        install(&env);
        env
    }

    #[test]
    fn quote_returns_argument_unevaluated() {
        let env = root();
        let form = Expr::new_proper_list(vec![Expr::symbol("quote"), Expr::symbol("undefined")]);
        let result = eval::eval(form, env).unwrap();
        assert_eq!(result.as_symbol(), Some("undefined"));
    }

    #[test]
    fn if_picks_the_right_branch() {
        let env = root();
        let t = Expr::new_proper_list(vec![
            Expr::symbol("if"),
            Expr::Boolean(true),
            Expr::Integer(1),
            Expr::Integer(2),
        ]);
        assert!(matches!(eval::eval(t, env.clone()), Ok(Expr::Integer(1))));

        let f = Expr::new_proper_list(vec![
            Expr::symbol("if"),
            Expr::Boolean(false),
            Expr::Integer(1),
            Expr::Integer(2),
        ]);
        assert!(matches!(eval::eval(f, env), Ok(Expr::Integer(2))));
    }

    #[test]
    fn define_variable_and_lookup() {
        let env = root();
        let form = Expr::new_proper_list(vec![Expr::symbol("define"), Expr::symbol("x"), Expr::Integer(42)]);
        eval::eval(form, env.clone()).unwrap();
        assert!(matches!(env.get("x"), Some(Expr::Integer(42))));
    }

    #[test]
    fn define_function_shorthand() {
        let env = root();
        let define = Expr::new_proper_list(vec![
            Expr::symbol("define"),
            Expr::new_proper_list(vec![Expr::symbol("id"), Expr::symbol("x")]),
            Expr::symbol("x"),
        ]);
        eval::eval(define, env.clone()).unwrap();
        let call = Expr::new_proper_list(vec![Expr::symbol("id"), Expr::Integer(9)]);
        assert!(matches!(eval::eval(call, env), Ok(Expr::Integer(9))));
    }

    #[test]
    fn set_bang_mutates_enclosing_binding() {
        let env = root();
        env.define("x", Expr::Integer(1));
        let form = Expr::new_proper_list(vec![Expr::symbol("set!"), Expr::symbol("x"), Expr::Integer(2)]);
        eval::eval(form, env.clone()).unwrap();
        assert!(matches!(env.get("x"), Some(Expr::Integer(2))));
    }

    #[test]
    fn set_bang_on_unbound_name_errors() {
        let env = root();
        let form = Expr::new_proper_list(vec![Expr::symbol("set!"), Expr::symbol("nope"), Expr::Integer(2)]);
        assert!(matches!(eval::eval(form, env), Err(EvalError::UnboundAssignment(_))));
    }

    #[test]
    fn let_bindings_do_not_see_each_other() {
        let env = root();
        env.define("x", Expr::Integer(100));
        let form = Expr::new_proper_list(vec![
            Expr::symbol("let"),
            Expr::new_proper_list(vec![
                Expr::new_proper_list(vec![Expr::symbol("x"), Expr::Integer(1)]),
                Expr::new_proper_list(vec![Expr::symbol("y"), Expr::symbol("x")]),
            ]),
            Expr::symbol("y"),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(100))));
    }

    #[test]
    fn let_star_bindings_see_earlier_ones() {
        let env = root();
        let form = Expr::new_proper_list(vec![
            Expr::symbol("let*"),
            Expr::new_proper_list(vec![
                Expr::new_proper_list(vec![Expr::symbol("x"), Expr::Integer(1)]),
                Expr::new_proper_list(vec![Expr::symbol("y"), Expr::symbol("x")]),
            ]),
            Expr::symbol("y"),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(1))));
    }

    #[test]
    fn named_let_supports_recursion() {
        let env = root();
        // (let loop ((n 3)) (if (quote #f) n (quote done))) - simplistic smoke test
        // without arithmetic builtins installed: just checks that the loop
        // name is callable and body runs once when the base case is taken.
        let form = Expr::new_proper_list(vec![
            Expr::symbol("let"),
            Expr::symbol("loop"),
            Expr::new_proper_list(vec![Expr::new_proper_list(vec![Expr::symbol("n"), Expr::Integer(3)])]),
            Expr::symbol("n"),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(3))));
    }

    #[test]
    fn letrec_allows_mutual_definition_before_use() {
        let env = root();
        let form = Expr::new_proper_list(vec![
            Expr::symbol("letrec"),
            Expr::new_proper_list(vec![
                Expr::new_proper_list(vec![
                    Expr::symbol("even?"),
                    Expr::new_proper_list(vec![
                        Expr::symbol("lambda"),
                        Expr::new_proper_list(vec![Expr::symbol("n")]),
                        Expr::new_proper_list(vec![
                            Expr::symbol("if"),
                            Expr::new_proper_list(vec![Expr::symbol("eq?"), Expr::symbol("n"), Expr::Integer(0)]),
                            Expr::Boolean(true),
                            Expr::new_proper_list(vec![
                                Expr::symbol("odd?"),
                                Expr::new_proper_list(vec![Expr::symbol("-"), Expr::symbol("n"), Expr::Integer(1)]),
                            ]),
                        ]),
                    ]),
                ]),
                Expr::new_proper_list(vec![
                    Expr::symbol("odd?"),
                    Expr::new_proper_list(vec![
                        Expr::symbol("lambda"),
                        Expr::new_proper_list(vec![Expr::symbol("n")]),
                        Expr::new_proper_list(vec![
                            Expr::symbol("if"),
                            Expr::new_proper_list(vec![Expr::symbol("eq?"), Expr::symbol("n"), Expr::Integer(0)]),
                            Expr::Boolean(false),
                            Expr::new_proper_list(vec![
                                Expr::symbol("even?"),
                                Expr::new_proper_list(vec![Expr::symbol("-"), Expr::symbol("n"), Expr::Integer(1)]),
                            ]),
                        ]),
                    ]),
                ]),
            ]),
            Expr::new_proper_list(vec![Expr::symbol("even?"), Expr::Integer(4)]),
        ]);
        env.define(
            "-",
            Expr::Procedure(Rc::new(Procedure::Native {
                name: "-".into(),
                kind: NativeKind::Value,
                arity: Arity::Exact(2),
                func: |a, _e| match (&a[0], &a[1]) {
                    (Expr::Integer(x), Expr::Integer(y)) => ProcResult::value(Expr::Integer(x - y)),
                    _ => unreachable!(),
                },
            })),
        );
        env.define(
            "eq?",
            Expr::Procedure(Rc::new(Procedure::Native {
                name: "eq?".into(),
                kind: NativeKind::Value,
                arity: Arity::Exact(2),
                func: |a, _e| ProcResult::value(Expr::Boolean(a[0].eqv(&a[1]))),
            })),
        );
        assert!(matches!(eval::eval(form, env), Ok(Expr::Boolean(true))));
    }

    #[test]
    fn and_short_circuits_on_false() {
        let env = root();
        let form = Expr::new_proper_list(vec![
            Expr::symbol("and"),
            Expr::Boolean(false),
            Expr::symbol("this-would-error-if-evaluated"),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Boolean(false))));
    }

    #[test]
    fn or_short_circuits_on_truthy() {
        let env = root();
        let form = Expr::new_proper_list(vec![
            Expr::symbol("or"),
            Expr::Integer(1),
            Expr::symbol("this-would-error-if-evaluated"),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(1))));
    }

    #[test]
    fn cond_falls_through_to_else() {
        let env = root();
        let form = Expr::new_proper_list(vec![
            Expr::symbol("cond"),
            Expr::new_proper_list(vec![Expr::Boolean(false), Expr::Integer(1)]),
            Expr::new_proper_list(vec![Expr::symbol("else"), Expr::Integer(2)]),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(2))));
    }

    #[test]
    fn cond_arrow_clause_applies_the_recipient_to_the_test_value() {
        let env = root();
        env.define(
            "add1",
            Expr::Procedure(Rc::new(Procedure::Native {
                name: "add1".into(),
                kind: NativeKind::Value,
                arity: Arity::Exact(1),
                func: |a, _e| match &a[0] {
                    Expr::Integer(n) => ProcResult::value(Expr::Integer(n + 1)),
                    _ => unreachable!(),
                },
            })),
        );
        let form = Expr::new_proper_list(vec![
            Expr::symbol("cond"),
            Expr::new_proper_list(vec![Expr::Integer(41), Expr::symbol("=>"), Expr::symbol("add1")]),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(42))));
    }

    #[test]
    fn define_macro_expands_before_evaluation() {
        let env = root();
        let defmacro = Expr::new_proper_list(vec![
            Expr::symbol("define-macro"),
            Expr::new_proper_list(vec![
                Expr::symbol("my-if"),
                Expr::symbol("c"),
                Expr::symbol("t"),
                Expr::symbol("f"),
            ]),
            Expr::new_proper_list(vec![
                Expr::symbol("quasiquote"),
                Expr::new_proper_list(vec![
                    Expr::symbol("if"),
                    Expr::new_proper_list(vec![Expr::symbol("unquote"), Expr::symbol("c")]),
                    Expr::new_proper_list(vec![Expr::symbol("unquote"), Expr::symbol("t")]),
                    Expr::new_proper_list(vec![Expr::symbol("unquote"), Expr::symbol("f")]),
                ]),
            ]),
        ]);
        eval::eval(defmacro, env.clone()).unwrap();
        let call = Expr::new_proper_list(vec![
            Expr::symbol("my-if"),
            Expr::Boolean(true),
            Expr::Integer(10),
            Expr::Integer(20),
        ]);
        assert!(matches!(eval::eval(call, env), Ok(Expr::Integer(10))));
    }

    #[test]
    fn do_loop_counts_down_and_returns_result() {
        let env = root();
        env.define(
            "-",
            Expr::Procedure(Rc::new(Procedure::Native {
                name: "-".into(),
                kind: NativeKind::Value,
                arity: Arity::Exact(2),
                func: |a, _e| match (&a[0], &a[1]) {
                    (Expr::Integer(x), Expr::Integer(y)) => ProcResult::value(Expr::Integer(x - y)),
                    _ => unreachable!(),
                },
            })),
        );
        // (do ((i 3 (- i 1))) ((eq-zero i) 'done)) using a hand-rolled zero test
        env.define(
            "zero?",
            Expr::Procedure(Rc::new(Procedure::Native {
                name: "zero?".into(),
                kind: NativeKind::Value,
                arity: Arity::Exact(1),
                func: |a, _e| ProcResult::value(Expr::Boolean(matches!(a[0], Expr::Integer(0)))),
            })),
        );
        let form = Expr::new_proper_list(vec![
            Expr::symbol("do"),
            Expr::new_proper_list(vec![Expr::new_proper_list(vec![
                Expr::symbol("i"),
                Expr::Integer(3),
                Expr::new_proper_list(vec![Expr::symbol("-"), Expr::symbol("i"), Expr::Integer(1)]),
            ])]),
            Expr::new_proper_list(vec![
                Expr::new_proper_list(vec![Expr::symbol("zero?"), Expr::symbol("i")]),
                Expr::symbol("i"),
            ]),
        ]);
        assert!(matches!(eval::eval(form, env), Ok(Expr::Integer(0))));
    }
}
