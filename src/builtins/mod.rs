// ABOUTME: Builtin registry — native procedures installed into the root environment
// ABOUTME: at engine construction, grouped into category modules per spec §4.6

use crate::env::EnvRef;
use crate::value::{Arity, Expr, NativeFn, NativeKind, Procedure};
use std::rc::Rc;

pub mod arithmetic;
pub mod chars;
pub mod comparison;
pub mod control;
pub mod io;
pub mod lists;
pub mod predicates;
pub mod strings;

/// Installs a single native binding into `env`. Every category module below
/// calls this once per builtin it declares — the same `Procedure::Native`
/// shape `special_forms::install` uses, since spec §4.5 models both as
/// ordinary `Procedure` records distinguished only by `NativeKind`.
pub(crate) fn def(env: &EnvRef, name: &str, kind: NativeKind, arity: Arity, func: NativeFn) {
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

/// Installs the full native procedure library (spec §4.6/SPEC_FULL §5) into
/// `env`, meant to be the root environment before the prelude loads.
pub fn install(env: &EnvRef) {
    arithmetic::install(env);
    comparison::install(env);
    predicates::install(env);
    lists::install(env);
    strings::install(env);
    chars::install(env);
    io::install(env);
    control::install(env);
}
