//! The `load` builtin: reads a script through the file-system accessor and
//! evaluates its forms, in order, in the interpreter's global environment.

use crate::env::Environment;
use crate::error::EvalError;
use crate::expander::{expand, MacroTable};
use crate::eval::evaluate;
use crate::fs_accessor::FileSystemAccessor;
use crate::reader::Reader;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

/// Reads `path` through `fs`, then reads/expands/evaluates every top-level
/// form in it against `env`/`macros`, returning the last value (or Unit for
/// an empty file). Mirrors `Evaluate`'s read-to-end-of-input loop, since
/// `load` is just `Evaluate` pointed at a nested source instead of the top
/// level input stream.
pub fn load(
    path: &str,
    env: &Rc<Environment>,
    macros: &MacroTable,
    fs: &FileSystemAccessor,
) -> Result<Value, EvalError> {
    let source = fs
        .open_for_read(path)
        .map_err(|e| EvalError::IoError(e.to_string()))?;
    let mut reader = Reader::new(&source);
    let mut result = Value::Unit;
    loop {
        match reader.read()? {
            Value::EndOfInput => return Ok(result),
            form => {
                let expanded = expand(&form, env, macros, true)?;
                result = evaluate(expanded, env.clone())?;
            }
        }
    }
}

pub fn register(env: &Rc<Environment>, macros: Rc<MacroTable>, fs: Rc<FileSystemAccessor>) {
    let target_env = env.clone();
    env.define(
        crate::symbol::Symbol::intern("load"),
        Value::NativeProcedure(Rc::new(NativeProcedure {
            name: "load",
            min_arity: 1,
            max_arity: Some(1),
            func: Box::new(move |args: &[Value]| {
                let path = match &args[0] {
                    Value::String(s) => s.clone(),
                    other => {
                        return Err(EvalError::type_error("load", "string", other.type_name()))
                    }
                };
                load(&path, &target_env, &macros, &fs)
            }),
        })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serial_test::serial;
    use std::path::PathBuf;

    fn fixture_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lispconf-io-builtin-tests-{name}"))
    }

    #[test]
    #[serial]
    fn load_evaluates_every_top_level_form_and_returns_the_last_value() {
        let dir = fixture_dir("load-basic");
        let _ = std::fs::remove_dir_all(&dir);
        let fs = Rc::new(
            FileSystemAccessor::read_write(&Config {
                fs_roots: vec![dir.clone()],
                max_file_size: 4096,
            })
            .unwrap(),
        );
        fs.open_for_write("script.ss", "(define x 1) (define y 2) (+ x y)").unwrap();

        let env = Environment::new();
        crate::builtins::register_core(&env);
        let macros = MacroTable::new();
        let result = load("script.ss", &env, &macros, &fs).unwrap();
        assert!(matches!(result, Value::Integer(3)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    #[serial]
    fn load_on_a_missing_file_is_an_io_error() {
        let dir = fixture_dir("load-missing");
        let _ = std::fs::remove_dir_all(&dir);
        let fs = Rc::new(
            FileSystemAccessor::read_write(&Config {
                fs_roots: vec![dir.clone()],
                max_file_size: 4096,
            })
            .unwrap(),
        );
        let env = Environment::new();
        crate::builtins::register_core(&env);
        let macros = MacroTable::new();
        assert!(matches!(load("nope.ss", &env, &macros, &fs), Err(EvalError::IoError(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
