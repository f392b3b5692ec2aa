// ABOUTME: Generic adapter lifting typed host functions into callable NativeProcedure values

use crate::error::EvalError;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

/// Coerces an argument `Value` into a host parameter type, the way the
/// host bridge's typed adapter is required to: widening Integer to Float
/// where the target expects a float, failing for any other mismatch.
pub trait FromValue: Sized {
    fn from_value(function: &str, value: &Value) -> Result<Self, EvalError>;
}

impl FromValue for i64 {
    fn from_value(function: &str, value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Integer(n) => Ok(*n),
            other => Err(EvalError::type_error(function, "integer", other.type_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(function: &str, value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Integer(n) => Ok(*n as f64),
            Value::Float(n) => Ok(*n),
            other => Err(EvalError::type_error(function, "number", other.type_name())),
        }
    }
}

impl FromValue for Rc<str> {
    fn from_value(function: &str, value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(EvalError::type_error(function, "string", other.type_name())),
        }
    }
}

impl FromValue for bool {
    fn from_value(_function: &str, value: &Value) -> Result<Self, EvalError> {
        Ok(value.is_truthy())
    }
}

/// Lifts a 1-ary host function into a `NativeProcedure` with a checked
/// arity of exactly one.
pub fn native1<A, F>(name: &'static str, f: F) -> Rc<NativeProcedure>
where
    A: FromValue,
    F: Fn(A) -> Result<Value, EvalError> + 'static,
{
    Rc::new(NativeProcedure {
        name,
        min_arity: 1,
        max_arity: Some(1),
        func: Box::new(move |args| f(A::from_value(name, &args[0])?)),
    })
}

/// Lifts a 2-ary host function into a `NativeProcedure` with a checked
/// arity of exactly two.
pub fn native2<A, B, F>(name: &'static str, f: F) -> Rc<NativeProcedure>
where
    A: FromValue,
    B: FromValue,
    F: Fn(A, B) -> Result<Value, EvalError> + 'static,
{
    Rc::new(NativeProcedure {
        name,
        min_arity: 2,
        max_arity: Some(2),
        func: Box::new(move |args| {
            let a = A::from_value(name, &args[0])?;
            let b = B::from_value(name, &args[1])?;
            f(a, b)
        }),
    })
}
