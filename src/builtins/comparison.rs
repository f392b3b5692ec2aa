//! Numeric comparison operations: =, <, <=, >, >=
//!
//! Each is a strict 2-ary numeric comparison; Integer and Float operands
//! compare by value (an Integer widens to Float for the comparison).
//! Structural equality across all value kinds lives in `predicates::eq`/`equal`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

fn as_f64(function: &str, value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(EvalError::type_error(function, "number", other.type_name())),
    }
}

fn compare(
    function: &'static str,
    args: &[Value],
    op: fn(f64, f64) -> bool,
) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error(function, "2", args.len()));
    }
    let a = as_f64(function, &args[0])?;
    let b = as_f64(function, &args[1])?;
    Ok(Value::Boolean(op(a, b)))
}

pub fn builtin_numeq(args: &[Value]) -> Result<Value, EvalError> {
    compare("=", args, |a, b| a == b)
}

pub fn builtin_lt(args: &[Value]) -> Result<Value, EvalError> {
    compare("<", args, |a, b| a < b)
}

pub fn builtin_le(args: &[Value]) -> Result<Value, EvalError> {
    compare("<=", args, |a, b| a <= b)
}

pub fn builtin_gt(args: &[Value]) -> Result<Value, EvalError> {
    compare(">", args, |a, b| a > b)
}

pub fn builtin_ge(args: &[Value]) -> Result<Value, EvalError> {
    compare(">=", args, |a, b| a >= b)
}

pub fn register(env: &Rc<Environment>) {
    let defs: [(&'static str, fn(&[Value]) -> Result<Value, EvalError>); 5] = [
        ("=", builtin_numeq),
        ("<", builtin_lt),
        ("<=", builtin_le),
        (">", builtin_gt),
        (">=", builtin_ge),
    ];
    for (name, func) in defs {
        env.define(
            crate::symbol::Symbol::intern(name),
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name,
                min_arity: 2,
                max_arity: Some(2),
                func: Box::new(func),
            })),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equality_widens_integer_to_float() {
        assert!(matches!(
            builtin_numeq(&[Value::Integer(5), Value::Float(5.0)]),
            Ok(Value::Boolean(true))
        ));
    }

    #[test]
    fn ordering_operators() {
        assert!(matches!(builtin_lt(&[Value::Integer(1), Value::Integer(2)]), Ok(Value::Boolean(true))));
        assert!(matches!(builtin_gt(&[Value::Integer(3), Value::Integer(2)]), Ok(Value::Boolean(true))));
        assert!(matches!(builtin_le(&[Value::Integer(2), Value::Integer(2)]), Ok(Value::Boolean(true))));
        assert!(matches!(builtin_ge(&[Value::Integer(2), Value::Integer(2)]), Ok(Value::Boolean(true))));
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(builtin_numeq(&[Value::Integer(1)]).is_err());
        assert!(builtin_numeq(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]).is_err());
    }

    #[test]
    fn non_numeric_operand_is_a_type_error() {
        assert!(matches!(
            builtin_lt(&[Value::string("a"), Value::Integer(1)]),
            Err(EvalError::TypeError(_))
        ));
    }
}
