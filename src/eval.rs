// ABOUTME: Trampolined evaluator for already-expanded Lisp expressions

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::{Symbol, KEYWORDS};
use crate::value::{NativeProcedure, ParamShape, Procedure, Value};
use std::collections::HashSet;
use std::rc::Rc;

/// Evaluates an expanded expression. `if`, `begin`, and procedure
/// application all mutate `expr`/`env` in place and loop instead of
/// recursing, so tail position never grows the Rust call stack.
pub fn evaluate(expr: Value, env: Rc<Environment>) -> Result<Value, EvalError> {
    let mut expr = expr;
    let mut env = env;

    loop {
        match expr {
            Value::Integer(_)
            | Value::Float(_)
            | Value::Boolean(_)
            | Value::String(_)
            | Value::Unit
            | Value::EndOfInput
            | Value::Procedure(_)
            | Value::NativeProcedure(_) => return Ok(expr),

            Value::Symbol(name) => return env.get(name),

            Value::List(items) => {
                if items.is_empty() {
                    return Ok(Value::list(vec![]));
                }

                if let Some(head) = items[0].as_symbol() {
                    if head == KEYWORDS.quote {
                        if items.len() != 2 {
                            return Err(EvalError::SyntaxError(
                                "quote: expected 1 argument".into(),
                            ));
                        }
                        return Ok(items[1].clone());
                    }

                    if head == KEYWORDS.if_ {
                        if items.len() < 3 || items.len() > 4 {
                            return Err(EvalError::SyntaxError(
                                "if: expected 2 or 3 arguments".into(),
                            ));
                        }
                        let condition = evaluate(items[1].clone(), env.clone())?;
                        expr = if condition.is_truthy() {
                            items[2].clone()
                        } else if items.len() == 4 {
                            items[3].clone()
                        } else {
                            return Ok(Value::Unit);
                        };
                        continue;
                    }

                    if head == KEYWORDS.begin {
                        if items.len() == 1 {
                            return Ok(Value::Unit);
                        }
                        for form in &items[1..items.len() - 1] {
                            evaluate(form.clone(), env.clone())?;
                        }
                        expr = items[items.len() - 1].clone();
                        continue;
                    }

                    if head == KEYWORDS.define {
                        return eval_define(&items[1..], &env);
                    }

                    if head == KEYWORDS.set {
                        return eval_set(&items[1..], &env);
                    }

                    if head == KEYWORDS.lambda {
                        return eval_lambda(&items[1..], &env, None);
                    }
                }

                let callee = evaluate(items[0].clone(), env.clone())?;
                let mut args = Vec::with_capacity(items.len().saturating_sub(1));
                for a in &items[1..] {
                    args.push(evaluate(a.clone(), env.clone())?);
                }

                match callee {
                    Value::NativeProcedure(native) => {
                        check_native_arity(&native, args.len())?;
                        return (native.func)(&args);
                    }
                    Value::Procedure(proc) => {
                        let call_env = Environment::with_parent(proc.env.clone());
                        bind_params(&proc.params, args, &call_env)?;
                        if proc.body.is_empty() {
                            return Ok(Value::Unit);
                        }
                        for form in &proc.body[..proc.body.len() - 1] {
                            evaluate(form.clone(), call_env.clone())?;
                        }
                        expr = proc.body[proc.body.len() - 1].clone();
                        env = call_env;
                        continue;
                    }
                    other => {
                        return Err(EvalError::TypeError(format!(
                            "cannot apply non-procedure value: {other}"
                        )));
                    }
                }
            }
        }
    }
}

/// Applies an already-evaluated procedure value to already-evaluated
/// arguments. Used by the `apply` builtin and by the expander to run a
/// macro transformer. Each call evaluates its own fresh trampoline, so this
/// is not itself tail-call-safe across repeated `apply` calls — only direct
/// application inside `evaluate`'s own loop is.
pub fn apply(callee: Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match callee {
        Value::NativeProcedure(native) => {
            check_native_arity(&native, args.len())?;
            (native.func)(&args)
        }
        Value::Procedure(proc) => {
            let call_env = Environment::with_parent(proc.env.clone());
            bind_params(&proc.params, args, &call_env)?;
            let mut result = Value::Unit;
            for form in proc.body.iter() {
                result = evaluate(form.clone(), call_env.clone())?;
            }
            Ok(result)
        }
        other => Err(EvalError::TypeError(format!(
            "cannot apply non-procedure value: {other}"
        ))),
    }
}

pub fn bind_params(
    params: &ParamShape,
    args: Vec<Value>,
    env: &Rc<Environment>,
) -> Result<(), EvalError> {
    if !params.accepts(args.len()) {
        let ParamShape::Fixed(names) = params else {
            unreachable!("Variadic accepts any argument count");
        };
        return Err(EvalError::arity_error(
            "procedure",
            names.len().to_string(),
            args.len(),
        ));
    }
    match params {
        ParamShape::Fixed(names) => {
            for (name, value) in names.iter().zip(args) {
                env.define(*name, value);
            }
        }
        ParamShape::Variadic(name) => {
            env.define(*name, Value::list(args));
        }
    }
    Ok(())
}

/// Parses a `lambda`/`define-macro` parameter spec: a bare symbol means
/// variadic, a list means fixed positional parameters with no duplicates.
pub fn parse_param_shape(spec: &Value) -> Result<ParamShape, EvalError> {
    match spec {
        Value::Symbol(s) => Ok(ParamShape::Variadic(*s)),
        Value::List(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items.iter() {
                let name = item.as_symbol().ok_or_else(|| {
                    EvalError::SyntaxError("parameter list must contain only symbols".into())
                })?;
                names.push(name);
            }
            let mut seen = HashSet::new();
            for name in &names {
                if !seen.insert(*name) {
                    return Err(EvalError::SyntaxError(format!(
                        "duplicate parameter name: {name}"
                    )));
                }
            }
            Ok(ParamShape::Fixed(names))
        }
        _ => Err(EvalError::SyntaxError(
            "parameter list must be a symbol or a list of symbols".into(),
        )),
    }
}

fn eval_lambda(rest: &[Value], env: &Rc<Environment>, name: Option<Symbol>) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::SyntaxError("lambda: missing parameter list".into()));
    }
    let params = parse_param_shape(&rest[0])?;
    let body = rest[1..].to_vec();
    if body.is_empty() {
        return Err(EvalError::SyntaxError("lambda: missing body".into()));
    }
    Ok(Value::Procedure(Rc::new(Procedure {
        name,
        params,
        body,
        env: env.clone(),
    })))
}

fn name_procedure(value: Value, name: Symbol) -> Value {
    if let Value::Procedure(proc) = &value {
        if proc.name.is_none() {
            return Value::Procedure(Rc::new(Procedure {
                name: Some(name),
                params: proc.params.clone(),
                body: proc.body.clone(),
                env: proc.env.clone(),
            }));
        }
    }
    value
}

fn eval_define(rest: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::SyntaxError("define: missing name".into()));
    }
    match &rest[0] {
        Value::Symbol(name) => {
            let value = if rest.len() >= 2 {
                evaluate(rest[1].clone(), env.clone())?
            } else {
                Value::Unit
            };
            env.define(*name, name_procedure(value, *name));
            Ok(Value::Unit)
        }
        Value::List(spec) if !spec.is_empty() => {
            let name = spec[0].as_symbol().ok_or_else(|| {
                EvalError::SyntaxError("define: function name must be a symbol".into())
            })?;
            let params = parse_param_shape(&Value::list(spec[1..].to_vec()))?;
            let body = rest[1..].to_vec();
            if body.is_empty() {
                return Err(EvalError::SyntaxError("define: missing function body".into()));
            }
            let proc = Value::Procedure(Rc::new(Procedure {
                name: Some(name),
                params,
                body,
                env: env.clone(),
            }));
            env.define(name, proc);
            Ok(Value::Unit)
        }
        _ => Err(EvalError::SyntaxError(
            "define: expected a symbol or (name params...)".into(),
        )),
    }
}

fn eval_set(rest: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if rest.len() != 2 {
        return Err(EvalError::SyntaxError("set!: expected 2 arguments".into()));
    }
    let name = rest[0]
        .as_symbol()
        .ok_or_else(|| EvalError::SyntaxError("set!: first argument must be a symbol".into()))?;
    let value = evaluate(rest[1].clone(), env.clone())?;
    env.set(name, value)?;
    Ok(Value::Unit)
}

fn check_native_arity(native: &NativeProcedure, argc: usize) -> Result<(), EvalError> {
    let too_few = argc < native.min_arity;
    let too_many = native.max_arity.is_some_and(|max| argc > max);
    if too_few || too_many {
        let expected = match native.max_arity {
            Some(max) if max == native.min_arity => native.min_arity.to_string(),
            Some(max) => format!("{}-{}", native.min_arity, max),
            None => format!("at least {}", native.min_arity),
        };
        return Err(EvalError::arity_error(native.name, expected, argc));
    }
    Ok(())
}
