mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod expander;
mod fs_accessor;
mod interpreter;
mod native;
mod reader;
mod symbol;
mod value;

use clap::Parser;
use config::Config;
use interpreter::Interpreter;
use reader::Reader;
use rustyline::error::ReadlineError;
use rustyline::{Config as RustylineConfig, Editor};
use std::path::PathBuf;

const WELCOME: &str = "lispconf — an embeddable Scheme-subset configuration language";

/// Lisp interpreter for embeddable, sandboxed configuration scripts
#[derive(Parser, Debug)]
#[command(name = "lispconf")]
#[command(version)]
#[command(about = "A Scheme-flavored configuration-language interpreter")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts a REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Grant read/write access to a directory (can be repeated)
    #[arg(long = "fs-root", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_roots: Vec<PathBuf>,

    /// Maximum file size the accessor will read in one go
    #[arg(long = "max-file-size", value_name = "BYTES", default_value = "10485760")]
    max_file_size: usize,
}

fn main() {
    let args = CliArgs::parse();

    let config = Config {
        fs_roots: args.fs_roots,
        max_file_size: args.max_file_size,
    };

    let interpreter = match Interpreter::new(config, Vec::new(), Some(".init.ss")) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            eprintln!("error: failed to initialize interpreter: {e}");
            std::process::exit(1);
        }
    };

    match args.script {
        Some(path) => run_script(&interpreter, &path),
        None => run_repl(&interpreter),
    }
}

fn run_script(interpreter: &Interpreter, path: &PathBuf) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    let mut reader = Reader::new(&source);
    let outcome = interpreter.evaluate(&mut reader);
    if let Some(e) = outcome.error {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    println!("{}", outcome.result);
}

fn run_repl(interpreter: &Interpreter) {
    let rl_config = RustylineConfig::builder().auto_add_history(true).build();
    let mut rl: Editor<(), _> = match Editor::with_config(rl_config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("error: failed to initialize REPL: {e}");
            std::process::exit(1);
        }
    };

    let history_file = ".lispconf_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME}");

    loop {
        match rl.readline("lispconf> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let mut reader = Reader::new(&line);
                let outcome = interpreter.evaluate(&mut reader);
                match outcome.error {
                    Some(e) => eprintln!("error: {e}"),
                    None => println!("{}", outcome.result),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\ngoodbye");
                break;
            }
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}
