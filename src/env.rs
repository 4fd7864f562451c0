// ABOUTME: Environment module for managing variable bindings, macro namespace, and scopes

use crate::error::EvalError;
use crate::value::Expr;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

pub type EnvRef = Rc<Environment>;

/// State owned by the root frame and shared (by `Rc`) with every descendant
/// frame created under it: the gensym counter and current working directory
/// (spec §3: "The root environment additionally owns a process-wide mutable
/// gensym counter and a current-working-directory string").
struct RootState {
    gensym_counter: Cell<u64>,
    cwd: RefCell<PathBuf>,
}

/// A lexical frame: a value namespace, a *separate* macro namespace, and a
/// parent reference. Environments are shared by reference — multiple
/// closures and callers observe each other's `set!` effects (spec §3/§5).
pub struct Environment {
    bindings: RefCell<HashMap<Rc<str>, Expr>>,
    macros: RefCell<HashMap<Rc<str>, Expr>>,
    parent: Option<EnvRef>,
    root: Rc<RootState>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> EnvRef {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            macros: RefCell::new(HashMap::new()),
            parent: None,
            root: Rc::new(RootState {
                gensym_counter: Cell::new(0),
                cwd: RefCell::new(PathBuf::from(".")),
            }),
        })
    }

    /// Creates a new child environment extending `parent`.
    pub fn extend(parent: &EnvRef) -> EnvRef {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            macros: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
            root: parent.root.clone(),
        })
    }

    /// Deep-copies the entire chain: every frame becomes a fresh frame with
    /// the same bindings, sharing no mutable state with the original chain
    /// (but still sharing the engine-wide root gensym counter/cwd, since
    /// those are process-wide per spec §3, not per-frame).
    pub fn copy(self: &EnvRef) -> EnvRef {
        let parent = self.parent.as_ref().map(|p| p.copy());
        Rc::new(Environment {
            bindings: RefCell::new(self.bindings.borrow().clone()),
            macros: RefCell::new(self.macros.borrow().clone()),
            parent,
            root: self.root.clone(),
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Defines a binding in THIS frame — always the innermost, silently
    /// shadowing or overwriting any existing binding in that frame.
    pub fn define(&self, name: impl Into<Rc<str>>, value: Expr) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Looks up a symbol, walking the parent chain.
    pub fn get(&self, name: &str) -> Option<Expr> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Writes to the nearest enclosing frame that already binds `name`.
    /// Fails with `UnboundAssignment` if no such frame exists.
    pub fn set(&self, name: &str, value: Expr) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.into(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(EvalError::UnboundAssignment(name.to_string())),
        }
    }

    /// Macro namespace is resolved before the value namespace and walks the
    /// same parent chain, but is a wholly separate map (spec §4.2).
    pub fn define_macro(&self, name: impl Into<Rc<str>>, transformer: Expr) {
        self.macros.borrow_mut().insert(name.into(), transformer);
    }

    pub fn get_macro(&self, name: &str) -> Option<Expr> {
        if let Some(value) = self.macros.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get_macro(name))
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.get_macro(name).is_some()
    }

    /// Produces a symbol guaranteed fresh relative to all previously
    /// returned gensyms from the same root (spec's GLOSSARY: Gensym).
    pub fn gensym(&self) -> Rc<str> {
        let n = self.root.gensym_counter.get();
        self.root.gensym_counter.set(n + 1);
        format!("#:gensym-{n}").into()
    }

    pub fn cwd(&self) -> PathBuf {
        self.root.cwd.borrow().clone()
    }

    pub fn set_cwd(&self, path: impl Into<PathBuf>) {
        *self.root.cwd.borrow_mut() = path.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x", Expr::Integer(42));
        assert!(matches!(env.get("x"), Some(Expr::Integer(42))));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Expr::Integer(42));

        let child = Environment::extend(&parent);
        child.define("x", Expr::Integer(100));

        assert!(matches!(child.get("x"), Some(Expr::Integer(100))));
        assert!(matches!(parent.get("x"), Some(Expr::Integer(42))));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.define("x", Expr::Integer(42));
        let child = Environment::extend(&parent);
        assert!(matches!(child.get("x"), Some(Expr::Integer(42))));
    }

    #[test]
    fn set_walks_to_defining_frame() {
        let parent = Environment::new();
        parent.define("x", Expr::Integer(1));
        let child = Environment::extend(&parent);

        child.set("x", Expr::Integer(2)).unwrap();

        assert!(matches!(parent.get("x"), Some(Expr::Integer(2))));
    }

    #[test]
    fn set_without_binding_fails() {
        let env = Environment::new();
        assert!(matches!(
            env.set("x", Expr::Integer(1)),
            Err(EvalError::UnboundAssignment(_))
        ));
    }

    #[test]
    fn macro_namespace_is_separate_from_value_namespace() {
        let env = Environment::new();
        env.define("swap!", Expr::Integer(1));
        env.define_macro("swap!", Expr::Integer(2));

        assert!(matches!(env.get("swap!"), Some(Expr::Integer(1))));
        assert!(matches!(env.get_macro("swap!"), Some(Expr::Integer(2))));
    }

    #[test]
    fn macro_lookup_walks_parent_chain() {
        let parent = Environment::new();
        parent.define_macro("m", Expr::Integer(7));
        let child = Environment::extend(&parent);
        assert!(child.has_macro("m"));
    }

    #[test]
    fn gensym_is_fresh_and_shared_across_frames() {
        let root = Environment::new();
        let child = Environment::extend(&root);
        let a = root.gensym();
        let b = child.gensym();
        assert_ne!(a, b);
    }

    #[test]
    fn cwd_defaults_and_is_settable() {
        let env = Environment::new();
        env.set_cwd("/tmp/scheme");
        assert_eq!(env.cwd(), PathBuf::from("/tmp/scheme"));
    }

    #[test]
    fn copy_deep_copies_chain_but_not_root_state() {
        let root = Environment::new();
        root.define("x", Expr::Integer(1));
        let child = Environment::extend(&root);
        child.define("y", Expr::Integer(2));

        let copied = child.copy();
        copied.define("y", Expr::Integer(99));

        assert!(matches!(child.get("y"), Some(Expr::Integer(2))));
        assert!(matches!(copied.get("y"), Some(Expr::Integer(99))));
        assert!(matches!(copied.get("x"), Some(Expr::Integer(1))));
    }
}
