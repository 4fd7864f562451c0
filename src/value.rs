// ABOUTME: Value types representing Scheme data and the evaluator's result shapes

use crate::env::EnvRef;
use crate::error::EvalError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Every Scheme object the evaluator can produce or consume.
///
/// `List` and `Str` wrap `Rc<RefCell<_>>` handles rather than owning their
/// contents directly: `cons`, `car`, `cdr`, `set-car!`, `set-cdr!` and
/// `string-set!` must be visible through every holder of the same handle
/// (spec §3/§5), which plain value semantics cannot express.
#[derive(Clone)]
pub enum Expr {
    Void,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    Str(Rc<RefCell<String>>),
    Symbol(Rc<str>),
    List(Rc<RefCell<ListData>>),
    Procedure(Rc<Procedure>),
}

/// The backing store for a List value: an ordered sequence of elements plus
/// a dotted-tail marker. `Tail::Proper` models `(a b c)`; `Tail::Improper`
/// models `(a b . c)`, where the payload is the non-list tail expression.
#[derive(Clone)]
pub struct ListData {
    pub items: Vec<Expr>,
    pub tail: Tail,
}

#[derive(Clone)]
pub enum Tail {
    Proper,
    Improper(Box<Expr>),
}

impl ListData {
    pub fn proper(items: Vec<Expr>) -> Self {
        ListData {
            items,
            tail: Tail::Proper,
        }
    }

    pub fn is_proper(&self) -> bool {
        matches!(self.tail, Tail::Proper)
    }
}

/// How many arguments a native procedure accepts. Validated before any
/// binding happens, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
            Arity::Range(lo, hi) => n >= *lo && n <= *hi,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Arity::Exact(k) => k.to_string(),
            Arity::AtLeast(k) => format!("at least {k}"),
            Arity::Range(lo, hi) => format!("{lo}-{hi}"),
        }
    }
}

/// A native procedure's evaluated-vs-unevaluated argument contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    /// Arguments are evaluated left-to-right before the native function runs.
    Value,
    /// Arguments are passed as raw, unevaluated forms (spec §4.6).
    SpecialForm,
}

/// What a native function or a lambda's tail position hands back to the
/// evaluator loop: either a final value, or an `(expr, env)` pair to
/// re-seat the loop on (spec §4.5's TailCall/Value discriminated return).
pub enum ProcResult {
    Value(Expr),
    TailCall(Expr, EnvRef),
}

impl ProcResult {
    pub fn value(v: Expr) -> Result<ProcResult, EvalError> {
        Ok(ProcResult::Value(v))
    }
}

pub type NativeFn = fn(&[Expr], &EnvRef) -> Result<ProcResult, EvalError>;

pub enum Procedure {
    Native {
        name: Rc<str>,
        kind: NativeKind,
        arity: Arity,
        func: NativeFn,
    },
    Lambda {
        name: Option<Rc<str>>,
        params: Vec<Rc<str>>,
        rest: Option<Rc<str>>,
        body: Vec<Expr>,
        env: EnvRef,
    },
}

impl Procedure {
    pub fn arity(&self) -> Arity {
        match self {
            Procedure::Native { arity, .. } => *arity,
            Procedure::Lambda { params, rest, .. } => {
                if rest.is_some() {
                    Arity::AtLeast(params.len())
                } else {
                    Arity::Exact(params.len())
                }
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Procedure::Native { name, .. } => Some(name),
            Procedure::Lambda { name, .. } => name.as_deref(),
        }
    }
}

impl Expr {
    pub fn symbol(name: impl Into<Rc<str>>) -> Expr {
        Expr::Symbol(name.into())
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Str(Rc::new(RefCell::new(s.into())))
    }

    pub fn new_proper_list(items: Vec<Expr>) -> Expr {
        Expr::List(Rc::new(RefCell::new(ListData::proper(items))))
    }

    pub fn new_dotted_list(items: Vec<Expr>, tail: Expr) -> Expr {
        Expr::List(Rc::new(RefCell::new(ListData {
            items,
            tail: Tail::Improper(Box::new(tail)),
        })))
    }

    pub fn nil() -> Expr {
        Expr::new_proper_list(Vec::new())
    }

    pub fn type_name(&self) -> String {
        match self {
            Expr::Void => "void",
            Expr::Boolean(_) => "boolean",
            Expr::Integer(_) => "integer",
            Expr::Float(_) => "float",
            Expr::Char(_) => "char",
            Expr::Str(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::List(_) => "list",
            Expr::Procedure(_) => "procedure",
        }
        .to_string()
    }

    /// Every value is truthy except `#f` (spec §3). `'()` and `0` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Expr::Boolean(false))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Expr::List(_))
    }

    pub fn is_proper_list(&self) -> bool {
        matches!(self, Expr::List(l) if l.borrow().is_proper())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Expr::List(l) if { let l = l.borrow(); l.is_proper() && l.items.is_empty() })
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Expr::Integer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Expr::Str(_))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Expr::Procedure(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Integer(n) => Some(*n as f64),
            Expr::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list_items(&self) -> Option<Vec<Expr>> {
        match self {
            Expr::List(l) => Some(l.borrow().items.clone()),
            _ => None,
        }
    }

    /// `eq?`/`eqv?`: identity for heap handles, value equality for atoms.
    /// Numbers compare by type *and* value — `(eqv? 1 1.0)` is `#f`.
    pub fn eqv(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Void, Expr::Void) => true,
            (Expr::Boolean(a), Expr::Boolean(b)) => a == b,
            (Expr::Integer(a), Expr::Integer(b)) => a == b,
            (Expr::Float(a), Expr::Float(b)) => a == b,
            (Expr::Char(a), Expr::Char(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::Str(a), Expr::Str(b)) => Rc::ptr_eq(a, b),
            (Expr::List(a), Expr::List(b)) => Rc::ptr_eq(a, b),
            (Expr::Procedure(a), Expr::Procedure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural equality. Terminates on acyclic values; cyclic structures
    /// are undefined behavior here (spec §8/§9 leave this unspecified).
    pub fn equal(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Str(a), Expr::Str(b)) => *a.borrow() == *b.borrow(),
            (Expr::List(a), Expr::List(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                if a.items.len() != b.items.len() {
                    return false;
                }
                let tails_equal = match (&a.tail, &b.tail) {
                    (Tail::Proper, Tail::Proper) => true,
                    (Tail::Improper(x), Tail::Improper(y)) => x.equal(y),
                    _ => false,
                };
                tails_equal && a.items.iter().zip(b.items.iter()).all(|(x, y)| x.equal(y))
            }
            _ => self.eqv(other),
        }
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, l: &ListData, write_mode: bool) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in l.items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        if write_mode {
            write!(f, "{}", Write(item))?;
        } else {
            write!(f, "{item}")?;
        }
    }
    if let Tail::Improper(tail) = &l.tail {
        write!(f, " . ")?;
        if write_mode {
            write!(f, "{}", Write(tail))?;
        } else {
            write!(f, "{tail}")?;
        }
    }
    write!(f, ")")
}

fn fmt_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e17 {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Expr {
    /// `display`-style: strings unquoted, chars unescaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Void => Ok(()),
            Expr::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Expr::Integer(n) => write!(f, "{n}"),
            Expr::Float(n) => write!(f, "{}", fmt_float(*n)),
            Expr::Char(c) => write!(f, "{c}"),
            Expr::Str(s) => write!(f, "{}", s.borrow()),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::List(l) => fmt_list(f, &l.borrow(), false),
            Expr::Procedure(p) => match p.name() {
                Some(name) => write!(f, "#<procedure:{name}>"),
                None => write!(f, "#<procedure>"),
            },
        }
    }
}

/// Wrapper that selects the `write`-style formatter (readable: strings
/// quoted, chars in `#\` form) instead of `display`'s.
pub struct Write<'a>(pub &'a Expr);

impl fmt::Display for Write<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Expr::Char(c) => write!(f, "#\\{c}"),
            Expr::Str(s) => write!(f, "{:?}", s.borrow() as &str),
            Expr::List(l) => fmt_list(f, &l.borrow(), true),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Write(self))
    }
}
