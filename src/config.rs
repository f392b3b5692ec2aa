// ABOUTME: Construction-time configuration for the interpreter's file-system accessor

use std::path::PathBuf;

/// The knobs a host or the CLI needs to construct an [`Interpreter`](crate::interpreter::Interpreter):
/// which directories the sandboxed file-system accessor may touch, and how
/// large a file it will read in one go.
#[derive(Debug, Clone)]
pub struct Config {
    pub fs_roots: Vec<PathBuf>,
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fs_roots: Vec::new(),
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
