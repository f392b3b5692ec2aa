//! Control and diagnostics: `not`, `assert`, `apply`, plus the `null` constant

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::apply as apply_procedure;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

pub fn builtin_not(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("not", "1", args.len()));
    }
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        other => Err(EvalError::type_error("not", "boolean", other.type_name())),
    }
}

pub fn builtin_assert(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::arity_error("assert", "1-2", args.len()));
    }
    if args[0].is_truthy() {
        return Ok(Value::Unit);
    }
    let message = match args.get(1) {
        Some(Value::String(s)) => s.to_string(),
        Some(other) => other.to_string(),
        None => "assertion failed".to_string(),
    };
    Err(EvalError::AssertionFailed(message))
}

pub fn builtin_apply(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("apply", "2", args.len()));
    }
    if !matches!(args[0], Value::Procedure(_) | Value::NativeProcedure(_)) {
        return Err(EvalError::type_error("apply", "procedure", args[0].type_name()));
    }
    let call_args = args[1]
        .as_list()
        .ok_or_else(|| EvalError::type_error("apply", "list", args[1].type_name()))?
        .to_vec();
    apply_procedure(args[0].clone(), call_args)
}

pub fn register(env: &Rc<Environment>) {
    let fixed_arity: [(&'static str, usize, Option<usize>, fn(&[Value]) -> Result<Value, EvalError>); 3] = [
        ("not", 1, Some(1), builtin_not as fn(&[Value]) -> Result<Value, EvalError>),
        ("assert", 1, Some(2), builtin_assert),
        ("apply", 2, Some(2), builtin_apply),
    ];
    for (name, min_arity, max_arity, func) in fixed_arity {
        env.define(
            crate::symbol::Symbol::intern(name),
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name,
                min_arity,
                max_arity,
                func: Box::new(func),
            })),
        );
    }

    env.define(crate::symbol::Symbol::intern("null"), Value::list(vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_negates_booleans_and_rejects_other_types() {
        assert!(matches!(builtin_not(&[Value::Boolean(true)]), Ok(Value::Boolean(false))));
        assert!(builtin_not(&[Value::Integer(0)]).is_err());
    }

    #[test]
    fn assert_passes_on_truthy_and_fails_on_falsey() {
        assert!(matches!(builtin_assert(&[Value::Boolean(true)]), Ok(Value::Unit)));
        assert!(matches!(
            builtin_assert(&[Value::Boolean(false)]),
            Err(EvalError::AssertionFailed(_))
        ));
    }

    #[test]
    fn assert_uses_the_optional_message() {
        let err = builtin_assert(&[Value::Boolean(false), Value::string("custom")]).unwrap_err();
        assert_eq!(err.to_string(), "assertion failed: custom");
    }

    #[test]
    fn apply_rejects_a_non_list_argument() {
        assert!(builtin_apply(&[
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name: "f",
                min_arity: 0,
                max_arity: None,
                func: Box::new(|_| Ok(Value::Unit)),
            })),
            Value::Integer(1),
        ])
        .is_err());
    }

    #[test]
    fn apply_invokes_a_native_procedure_with_the_list_contents() {
        let proc = Value::NativeProcedure(Rc::new(NativeProcedure {
            name: "sum2",
            min_arity: 2,
            max_arity: Some(2),
            func: Box::new(|args| match (&args[0], &args[1]) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
                _ => Err(EvalError::TypeError("expected integers".into())),
            }),
        }));
        let result = builtin_apply(&[proc, Value::list(vec![Value::Integer(2), Value::Integer(3)])]).unwrap();
        assert!(matches!(result, Value::Integer(5)));
    }
}
