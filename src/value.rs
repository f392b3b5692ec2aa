// ABOUTME: Value types representing Lisp data structures and expressions

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::Symbol;
use std::fmt;
use std::rc::Rc;

/// The shape of a procedure's parameter list: either a fixed-arity list of
/// distinct symbols bound positionally, or a single symbol that collects
/// the entire argument list (variadic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    Fixed(Vec<Symbol>),
    Variadic(Symbol),
}

impl ParamShape {
    pub fn accepts(&self, argc: usize) -> bool {
        match self {
            ParamShape::Fixed(params) => params.len() == argc,
            ParamShape::Variadic(_) => true,
        }
    }
}

/// A user-defined closure: its parameter shape, body, and the environment it
/// closed over at the point of `lambda`/`define`.
#[derive(Debug)]
pub struct Procedure {
    pub name: Option<Symbol>,
    pub params: ParamShape,
    pub body: Vec<Value>,
    pub env: Rc<Environment>,
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, EvalError>;

/// A host-provided primitive, exposed into the Lisp environment under a
/// fixed name with a declared arity range.
pub struct NativeProcedure {
    pub name: &'static str,
    pub min_arity: usize,
    pub max_arity: Option<usize>,
    pub func: Box<NativeFn>,
}

impl fmt::Debug for NativeProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeProcedure")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Symbol(Symbol),
    List(Rc<Vec<Value>>),
    Procedure(Rc<Procedure>),
    NativeProcedure(Rc<NativeProcedure>),
    /// The canonical "nothing to show" result, distinct from the empty list.
    Unit,
    /// Returned by an incremental reader when the underlying stream is
    /// exhausted between top-level forms; never produced by evaluation.
    EndOfInput,
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(Symbol::intern(name))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Procedure(_) => "procedure",
            Value::NativeProcedure(_) => "procedure",
            Value::Unit => "unit",
            Value::EndOfInput => "end-of-input",
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::Variadic(name) => write!(f, "{}", name),
            ParamShape::Fixed(names) => {
                write!(f, "(")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            // Printed representation per the session-driver contract: a
            // procedure prints as the `(lambda params body...)` form that
            // would reconstruct it, not an opaque handle.
            Value::Procedure(p) => {
                write!(f, "(lambda {}", p.params)?;
                for form in p.body.iter() {
                    write!(f, " {}", form)?;
                }
                write!(f, ")")
            }
            Value::NativeProcedure(p) => write!(f, "#<NativeProcedure:{}>", p.name),
            // Unit carries no printable content; side-effecting forms echo nothing.
            Value::Unit => write!(f, ""),
            Value::EndOfInput => write!(f, "#<end-of-input>"),
        }
    }
}
