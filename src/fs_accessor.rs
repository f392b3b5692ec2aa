// ABOUTME: Capability-based sandboxed file-system access for the `load`/`read-file` builtins

use crate::config::Config;
use cap_std::fs::Dir;

/// Errors from the file-system accessor, distinct from [`crate::error::EvalError`]
/// so callers can decide how to fold them in (the builtins layer maps every
/// variant to `EvalError::IoError`).
#[derive(Debug, Clone)]
pub enum AccessorError {
    PathNotAllowed(String),
    FileNotFound(String),
    FileTooLarge { path: String, size: u64, limit: usize },
    Io(String),
}

impl std::fmt::Display for AccessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessorError::PathNotAllowed(path) => {
                write!(f, "access denied: {path} is outside the allowed roots")
            }
            AccessorError::FileNotFound(path) => write!(f, "file not found: {path}"),
            AccessorError::FileTooLarge { path, size, limit } => {
                write!(f, "{path} is {size} bytes, over the {limit}-byte limit")
            }
            AccessorError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for AccessorError {}

/// Grants a Lisp program read (and, when constructed via [`FileSystemAccessor::read_write`],
/// write) access to a fixed set of directories. With no roots configured,
/// every operation is rejected — capability, not ambient access.
pub struct FileSystemAccessor {
    roots: Vec<Dir>,
    max_file_size: usize,
    read_only: bool,
}

impl FileSystemAccessor {
    /// An accessor with no granted roots: every read or write is rejected.
    pub fn none() -> FileSystemAccessor {
        FileSystemAccessor {
            roots: Vec::new(),
            max_file_size: 0,
            read_only: true,
        }
    }

    pub fn read_write(config: &Config) -> Result<FileSystemAccessor, AccessorError> {
        Self::open(config, false)
    }

    pub fn read_only(config: &Config) -> Result<FileSystemAccessor, AccessorError> {
        Self::open(config, true)
    }

    fn open(config: &Config, read_only: bool) -> Result<FileSystemAccessor, AccessorError> {
        let mut roots = Vec::with_capacity(config.fs_roots.len());
        for path in &config.fs_roots {
            if !read_only {
                std::fs::create_dir_all(path)
                    .map_err(|e| AccessorError::Io(format!("cannot create {}: {e}", path.display())))?;
            }
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
                .map_err(|e| AccessorError::Io(format!("cannot open {}: {e}", path.display())))?;
            roots.push(dir);
        }
        Ok(FileSystemAccessor {
            roots,
            max_file_size: config.max_file_size,
            read_only,
        })
    }

    fn validate(path: &str) -> Result<(), AccessorError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(AccessorError::PathNotAllowed(path.to_string()));
        }
        Ok(())
    }

    pub fn open_for_read(&self, path: &str) -> Result<String, AccessorError> {
        Self::validate(path)?;
        for root in &self.roots {
            if let Ok(metadata) = root.metadata(path) {
                if metadata.len() > self.max_file_size as u64 {
                    return Err(AccessorError::FileTooLarge {
                        path: path.to_string(),
                        size: metadata.len(),
                        limit: self.max_file_size,
                    });
                }
                return root
                    .read_to_string(path)
                    .map_err(|e| AccessorError::Io(e.to_string()));
            }
        }
        Err(AccessorError::FileNotFound(path.to_string()))
    }

    pub fn open_for_write(&self, path: &str, contents: &str) -> Result<(), AccessorError> {
        Self::validate(path)?;
        if self.read_only || self.roots.is_empty() {
            return Err(AccessorError::PathNotAllowed(path.to_string()));
        }
        self.roots[0]
            .write(path, contents.as_bytes())
            .map_err(|e| AccessorError::Io(e.to_string()))
    }

    pub fn file_exists(&self, path: &str) -> bool {
        if Self::validate(path).is_err() {
            return false;
        }
        self.roots.iter().any(|root| root.metadata(path).is_ok())
    }
}
