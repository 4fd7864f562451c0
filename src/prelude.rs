// ABOUTME: Bundled Scheme prelude loader — evaluates src/prelude/*.scm into
// ABOUTME: the root environment at engine construction (spec §6)

use crate::env::EnvRef;
use crate::error::EvalError;
use crate::parser;

const CORE: &str = include_str!("prelude/core.scm");
const MATCH: &str = include_str!("prelude/match.scm");
const STREAMS: &str = include_str!("prelude/streams.scm");

/// Evaluates every bundled prelude module, in dependency order, into `env`.
pub fn load(env: &EnvRef) -> Result<(), EvalError> {
    for source in [CORE, MATCH, STREAMS] {
        eval_module(source, env)?;
    }
    Ok(())
}

fn eval_module(source: &str, env: &EnvRef) -> Result<(), EvalError> {
    let forms = parser::parse_all(source).map_err(EvalError::ParseError)?;
    for form in forms {
        crate::eval::eval(form, env.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    fn fresh_env() -> EnvRef {
        let env = Environment::new();
        crate::special_forms::install(&env);
        crate::builtins::install(&env);
        env
    }

    #[test]
    fn prelude_loads_without_error() {
        let env = fresh_env();
        assert!(load(&env).is_ok());
    }

    #[test]
    fn caar_through_cddddr_are_defined() {
        let env = fresh_env();
        load(&env).unwrap();
        let result = crate::eval::eval(
            parser::parse_all("(cadr (list 1 2 3))").unwrap().remove(0),
            env,
        )
        .unwrap();
        assert!(matches!(result, crate::value::Expr::Integer(2)));
    }

    #[test]
    fn match_macro_is_defined() {
        let env = fresh_env();
        load(&env).unwrap();
        let source = "(match (list 1 2) ((a b) (+ a b)) (else 0))";
        let result = crate::eval::eval(parser::parse_all(source).unwrap().remove(0), env).unwrap();
        assert!(matches!(result, crate::value::Expr::Integer(3)));
    }

    #[test]
    fn scenario_lazy_streams() {
        let env = fresh_env();
        load(&env).unwrap();
        let source = "(define (ints n) (lazy-cons n (ints (+ n 1)))) \
                      (head (lazy-map (lambda (x) (* x x)) (ints 1)) 4)";
        let mut result = crate::value::Expr::Void;
        for form in parser::parse_all(source).unwrap() {
            result = crate::eval::eval(form, env.clone()).unwrap();
        }
        assert_eq!(format!("{result}"), "(1 4 9 16)");
    }
}
