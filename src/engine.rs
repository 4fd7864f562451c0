// ABOUTME: Embeddable Engine API — owns the root environment, loads the prelude
// ABOUTME: at construction, and folds the evaluator over parsed source (spec §4.7/§6)

use crate::env::{EnvRef, Environment};
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeFn, NativeKind};
use crate::{builtins, parser, prelude, special_forms};
use std::path::Path;

/// Owns a root `Environment` and exposes the host-facing surface a driver
/// (REPL, script runner, or an embedding program) calls instead of reaching
/// into `eval`/`parser`/`builtins` directly.
pub struct Engine {
    env: EnvRef,
}

impl Engine {
    /// Builds a root environment with special forms, the native builtin
    /// library, and the bundled prelude (`src/prelude/*.scm`) installed.
    pub fn new() -> Engine {
        let engine = Engine::new_without_prelude();
        prelude::load(&engine.env).expect("bundled prelude must evaluate cleanly");
        engine
    }

    /// Builds a root environment with special forms and native builtins
    /// installed, but no prelude — for embedders who want a minimal root
    /// (spec §6).
    pub fn new_without_prelude() -> Engine {
        let env = Environment::new();
        special_forms::install(&env);
        builtins::install(&env);
        Engine { env }
    }

    /// Parses `source` into a sequence of forms and evaluates them in
    /// order against the root environment, returning the last value.
    pub fn eval(&self, source: &str) -> Result<Expr, EvalError> {
        let forms = parser::parse_all(source).map_err(EvalError::ParseError)?;
        let mut result = Expr::Void;
        for form in forms {
            result = crate::eval::eval(form, self.env.clone())?;
        }
        Ok(result)
    }

    /// Registers a native procedure into the root environment, for
    /// embedders extending the engine with host functions.
    pub fn register_fn(&self, name: &str, kind: NativeKind, arity: Arity, handler: NativeFn) {
        builtins::def(&self.env, name, kind, arity, handler);
    }

    pub fn env(&self) -> EnvRef {
        self.env.clone()
    }

    pub fn set_cwd(&self, path: impl AsRef<Path>) {
        self.env.set_cwd(path.as_ref());
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
