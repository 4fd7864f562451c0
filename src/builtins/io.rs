// ABOUTME: I/O builtins — display, write, newline, all writing to stdout

use crate::builtins::def;
use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::{Arity, Expr, NativeKind, ProcResult, Write as WriteForm};
use std::io::{self, Write as _};

fn display(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    print!("{}", args[0]);
    let _ = io::stdout().flush();
    ProcResult::value(Expr::Void)
}

fn write(args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    print!("{}", WriteForm(&args[0]));
    let _ = io::stdout().flush();
    ProcResult::value(Expr::Void)
}

fn newline(_args: &[Expr], _env: &EnvRef) -> Result<ProcResult, EvalError> {
    println!();
    ProcResult::value(Expr::Void)
}

pub fn install(env: &EnvRef) {
    def(env, "display", NativeKind::Value, Arity::Exact(1), display);
    def(env, "write", NativeKind::Value, Arity::Exact(1), write);
    def(env, "newline", NativeKind::Value, Arity::Exact(0), newline);
}
