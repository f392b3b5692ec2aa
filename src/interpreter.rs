// ABOUTME: Host-facing Interpreter type: construction, extension layering, and session drivers

use std::io::Write;
use std::rc::Rc;

use crate::builtins;
use crate::config::Config;
use crate::env::Environment;
use crate::error::EvalError;
use crate::expander::{expand, MacroTable};
use crate::eval::evaluate;
use crate::fs_accessor::FileSystemAccessor;
use crate::reader::Reader;
use crate::symbol::Symbol;
use crate::value::Value;

/// The bootstrap script: defines `let`, `cond`, `and`/`or`, and a handful of
/// other pure-script conveniences. Evaluated once per `Interpreter`, before
/// any host extension layer's definitions are exercised by user code.
const BOOTSTRAP_SOURCE: &str = include_str!("init.ss");

/// A construction-time extension layer: given the interpreter under
/// construction, returns the bindings it contributes. Host layers are
/// applied in order, each as a nested environment over the previous one —
/// later layers, and then user code, can see and shadow earlier ones.
pub type Extension = Box<dyn Fn(&Interpreter) -> Vec<(Symbol, Value)>>;

/// The result of a batch [`Interpreter::evaluate`] run: the last
/// successfully evaluated value (Unit if none), and the error that stopped
/// the batch, if any.
pub struct EvalOutcome {
    pub result: Value,
    pub error: Option<EvalError>,
}

/// An embeddable interpreter instance: lexical environment chain, macro
/// table, and the one file-system accessor it funnels `load` (and any
/// host-defined I/O primitive) through.
pub struct Interpreter {
    global_env: Rc<Environment>,
    macros: Rc<MacroTable>,
    fs: Rc<FileSystemAccessor>,
}

impl Interpreter {
    /// Builds a fresh interpreter: empty root → built-ins layer → each
    /// `extensions` layer, in order, as nested environments, then the
    /// embedded bootstrap resource, then an optional `.init.ss` discovered
    /// through `fs` if `host_init_path` names one that exists.
    pub fn new(
        config: Config,
        extensions: Vec<Extension>,
        host_init_path: Option<&str>,
    ) -> Result<Interpreter, EvalError> {
        let fs = Rc::new(
            FileSystemAccessor::read_write(&config).map_err(|e| EvalError::IoError(e.to_string()))?,
        );
        Self::with_accessor(fs, extensions, host_init_path)
    }

    /// As [`Interpreter::new`], but with an already-constructed accessor —
    /// lets a host supply a read-only or otherwise custom implementation
    /// instead of the default read-write sandboxed one.
    pub fn with_accessor(
        fs: Rc<FileSystemAccessor>,
        extensions: Vec<Extension>,
        host_init_path: Option<&str>,
    ) -> Result<Interpreter, EvalError> {
        let root = Environment::new();
        let builtins_env = Environment::with_parent(root);
        builtins::register_core(&builtins_env);

        let macros = Rc::new(MacroTable::new());
        builtins::register_io(&builtins_env, macros.clone(), fs.clone());

        let mut env = builtins_env;
        let interpreter_stub = Interpreter {
            global_env: env.clone(),
            macros: macros.clone(),
            fs: fs.clone(),
        };
        for extension in &extensions {
            let layer = Environment::with_parent(env.clone());
            for (name, value) in extension(&interpreter_stub) {
                layer.define(name, value);
            }
            env = layer;
        }

        let interpreter = Interpreter {
            global_env: env,
            macros,
            fs,
        };

        interpreter.run_source(BOOTSTRAP_SOURCE)?;

        if let Some(path) = host_init_path {
            if interpreter.fs.file_exists(path) {
                interpreter.run_source_from_accessor(path)?;
            }
        }

        Ok(interpreter)
    }

    /// Injects or overwrites a top-level binding in the global environment.
    pub fn define_global(&self, name: &str, value: Value) {
        self.global_env.define(Symbol::intern(name), value);
    }

    pub fn root_env(&self) -> &Rc<Environment> {
        &self.global_env
    }

    pub fn fs_accessor(&self) -> &FileSystemAccessor {
        &self.fs
    }

    /// `Evaluate(reader)`: reads, expands, and evaluates expressions until
    /// end-of-input, returning the last successfully evaluated value. An
    /// error stops the batch immediately — no further expressions are read.
    pub fn evaluate(&self, reader: &mut Reader) -> EvalOutcome {
        let mut result = Value::Unit;
        loop {
            match reader.read() {
                Ok(Value::EndOfInput) => return EvalOutcome { result, error: None },
                Ok(form) => match self.expand_and_evaluate(form) {
                    Ok(value) => result = value,
                    Err(e) => return EvalOutcome { result, error: Some(e) },
                },
                Err(e) => return EvalOutcome { result, error: Some(e) },
            }
        }
    }

    /// `REPL(reader, writer, prompt?, headers?)`: prints `headers` once if
    /// given, then repeatedly prints `prompt` (if any), reads one
    /// expression, evaluates it, and prints either its printed
    /// representation or the error message — continuing the loop either
    /// way, with the same environment and macro table. Terminates on
    /// end-of-input.
    pub fn repl(
        &self,
        reader: &mut Reader,
        writer: &mut dyn Write,
        prompt: Option<&str>,
        headers: Option<&[&str]>,
    ) -> std::io::Result<()> {
        if let Some(headers) = headers {
            for line in headers {
                writeln!(writer, "{line}")?;
            }
        }
        loop {
            if let Some(prompt) = prompt {
                write!(writer, "{prompt}")?;
                writer.flush()?;
            }
            match reader.read() {
                Ok(Value::EndOfInput) => return Ok(()),
                Ok(form) => match self.expand_and_evaluate(form) {
                    Ok(value) => writeln!(writer, "{value}")?,
                    Err(e) => writeln!(writer, "{e}")?,
                },
                Err(e) => writeln!(writer, "{e}")?,
            }
        }
    }

    fn expand_and_evaluate(&self, form: Value) -> Result<Value, EvalError> {
        let expanded = expand(&form, &self.global_env, &self.macros, true)?;
        evaluate(expanded, self.global_env.clone())
    }

    fn run_source(&self, source: &str) -> Result<(), EvalError> {
        let mut reader = Reader::new(source);
        loop {
            match reader.read()? {
                Value::EndOfInput => return Ok(()),
                form => {
                    self.expand_and_evaluate(form)?;
                }
            }
        }
    }

    fn run_source_from_accessor(&self, path: &str) -> Result<(), EvalError> {
        let source = self
            .fs
            .open_for_read(path)
            .map_err(|e| EvalError::IoError(e.to_string()))?;
        self.run_source(&source)
    }
}
