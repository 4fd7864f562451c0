// ABOUTME: String builtins — string-length string-ref string-set! string-append
// ABOUTME: substring string->symbol symbol->string string->list number->string string->number string=?

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult};
use std::cell::RefCell;
use std::rc::Rc;

fn require_string<'a>(e: &'a Expr, function: &str, position: usize) -> Result<&'a Rc<RefCell<String>>, EvalError> {
    match e {
        Expr::Str(s) => Ok(s),
        other => Err(EvalError::type_error(function, "string", other, position)),
    }
}

fn require_char_index(e: &Expr, function: &str, position: usize) -> Result<usize, EvalError> {
    match e {
        Expr::Integer(n) if *n >= 0 => Ok(*n as usize),
        other => Err(EvalError::type_error(function, "non-negative integer", other, position)),
    }
}

fn string_length(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string-length", 0)?;
    ProcResult::value(Expr::Integer(s.borrow().chars().count() as i64))
}

fn string_ref(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string-ref", 0)?;
    let i = require_char_index(&args[1], "string-ref", 1)?;
    let c = s
        .borrow()
        .chars()
        .nth(i)
        .ok_or_else(|| EvalError::runtime_error("string-ref", "index out of range"))?;
    ProcResult::value(Expr::Char(c))
}

fn string_set(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string-set!", 0)?;
    let i = require_char_index(&args[1], "string-set!", 1)?;
    let c = match &args[2] {
        Expr::Char(c) => *c,
        other => return Err(EvalError::type_error("string-set!", "char", other, 2)),
    };
    let mut chars: Vec<char> = s.borrow().chars().collect();
    if i >= chars.len() {
        return Err(EvalError::runtime_error("string-set!", "index out of range"));
    }
    chars[i] = c;
    *s.borrow_mut() = chars.into_iter().collect();
    ProcResult::value(Expr::Void)
}

fn string_append(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let mut result = String::new();
    for (i, a) in args.iter().enumerate() {
        let s = require_string(a, "string-append", i)?;
        result.push_str(&s.borrow());
    }
    ProcResult::value(Expr::string(result))
}

fn substring(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "substring", 0)?;
    let start = require_char_index(&args[1], "substring", 1)?;
    let chars: Vec<char> = s.borrow().chars().collect();
    let end = if args.len() > 2 {
        require_char_index(&args[2], "substring", 2)?
    } else {
        chars.len()
    };
    if start > end || end > chars.len() {
        return Err(EvalError::runtime_error("substring", "index out of range"));
    }
    ProcResult::value(Expr::string(chars[start..end].iter().collect::<String>()))
}

fn string_to_symbol(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string->symbol", 0)?;
    ProcResult::value(Expr::symbol(s.borrow().clone()))
}

fn symbol_to_string(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let name = args[0]
        .as_symbol()
        .ok_or_else(|| EvalError::type_error("symbol->string", "symbol", &args[0], 0))?;
    ProcResult::value(Expr::string(name))
}

fn string_to_list(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string->list", 0)?;
    let items = s.borrow().chars().map(Expr::Char).collect();
    ProcResult::value(Expr::new_proper_list(items))
}

fn number_to_string(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    match &args[0] {
        Expr::Integer(_) | Expr::Float(_) => ProcResult::value(Expr::string(args[0].to_string())),
        other => Err(EvalError::type_error("number->string", "number", other, 0)),
    }
}

fn string_to_number(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    let s = require_string(&args[0], "string->number", 0)?;
    let text = s.borrow();
    let result = if text.contains('.') {
        text.parse::<f64>().ok().map(Expr::Float)
    } else {
        text.parse::<i64>().ok().map(Expr::Integer)
    };
    ProcResult::value(result.unwrap_or(Expr::Boolean(false)))
}

fn string_eq(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    for i in 0..args.len() - 1 {
        let a = require_string(&args[i], "string=?", i)?;
        let b = require_string(&args[i + 1], "string=?", i + 1)?;
        if *a.borrow() != *b.borrow() {
            return ProcResult::value(Expr::Boolean(false));
        }
    }
    ProcResult::value(Expr::Boolean(true))
}

pub fn install(env: &EnvRef) {
    def(env, "string-length", NativeKind::Value, Arity::Exact(1), string_length);
    def(env, "string-ref", NativeKind::Value, Arity::Exact(2), string_ref);
    def(env, "string-set!", NativeKind::Value, Arity::Exact(3), string_set);
    def(env, "string-append", NativeKind::Value, Arity::AtLeast(0), string_append);
    def(env, "substring", NativeKind::Value, Arity::Range(2, 3), substring);
    def(env, "string->symbol", NativeKind::Value, Arity::Exact(1), string_to_symbol);
    def(env, "symbol->string", NativeKind::Value, Arity::Exact(1), symbol_to_string);
    def(env, "string->list", NativeKind::Value, Arity::Exact(1), string_to_list);
    def(env, "number->string", NativeKind::Value, Arity::Exact(1), number_to_string);
    def(env, "string->number", NativeKind::Value, Arity::Exact(1), string_to_number);
    def(env, "string=?", NativeKind::Value, Arity::AtLeast(1), string_eq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    fn call(name: &str, args: Vec<Expr>) -> Result<Expr, EvalError> {
        let env = Environment::new();
        install(&env);
        let form = Expr::new_proper_list(std::iter::once(Expr::symbol(name)).chain(args).collect());
        crate::eval::eval(form, env)
    }

    #[test]
    fn string_length_counts_chars_not_bytes() {
        assert!(matches!(call("string-length", vec![Expr::string("héllo")]), Ok(Expr::Integer(5))));
    }

    #[test]
    fn string_ref_and_set_roundtrip() {
        let s = Expr::string("cat");
        assert!(matches!(call("string-ref", vec![s.clone(), Expr::Integer(1)]), Ok(Expr::Char('a'))));
        call("string-set!", vec![s.clone(), Expr::Integer(0), Expr::Char('b')]).unwrap();
        assert_eq!(format!("{s}"), "bat");
    }

    #[test]
    fn string_append_concatenates_all_arguments() {
        let result = call("string-append", vec![Expr::string("foo"), Expr::string("bar")]).unwrap();
        assert_eq!(format!("{result}"), "foobar");
    }

    #[test]
    fn substring_with_and_without_end() {
        let s = Expr::string("hello world");
        assert_eq!(format!("{}", call("substring", vec![s.clone(), Expr::Integer(6)]).unwrap()), "world");
        assert_eq!(
            format!("{}", call("substring", vec![s, Expr::Integer(0), Expr::Integer(5)]).unwrap()),
            "hello"
        );
    }

    #[test]
    fn symbol_string_roundtrip() {
        let sym = call("string->symbol", vec![Expr::string("foo")]).unwrap();
        assert!(sym.is_symbol());
        let back = call("symbol->string", vec![sym]).unwrap();
        assert_eq!(format!("{back}"), "foo");
    }

    #[test]
    fn number_string_roundtrip() {
        assert_eq!(format!("{}", call("number->string", vec![Expr::Integer(42)]).unwrap()), "42");
        assert!(matches!(call("string->number", vec![Expr::string("42")]), Ok(Expr::Integer(42))));
        assert!(matches!(call("string->number", vec![Expr::string("3.5")]), Ok(Expr::Float(n)) if n == 3.5));
        assert!(matches!(call("string->number", vec![Expr::string("nope")]), Ok(Expr::Boolean(false))));
    }

    #[test]
    fn string_eq_compares_contents() {
        assert!(matches!(call("string=?", vec![Expr::string("a"), Expr::string("a")]), Ok(Expr::Boolean(true))));
        assert!(matches!(call("string=?", vec![Expr::string("a"), Expr::string("b")]), Ok(Expr::Boolean(false))));
    }
}
