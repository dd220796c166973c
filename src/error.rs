//! # Error Handling
//!
//! This module defines the centralized error type for template assembly. It
//! uses `thiserror` to describe every failure the core can observe, grouped
//! the way callers need to react to them:
//!
//! - **Not found**: a package manifest or source file is missing. The module
//!   resolver treats this class as a signal to look for a hoisted package in
//!   an ancestor dependency directory; the sync engine degrades it to a skip.
//! - **Malformed input**: a manifest or conf document could not be parsed.
//!   Only the affected unit of work is aborted.
//! - **I/O failure**: a write, copy or delete failed. Reported, then the
//!   caller moves on to the next manifest entry.
//! - **Setup**: a failure that makes the whole run meaningless, such as an
//!   unparsable top-level `package.json`.
//!
//! `Result<T>` is the usual alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for template assembly operations
#[derive(Error, Debug)]
pub enum Error {
    /// A file or directory that was expected to exist is missing.
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A package manifest or conf document exists but could not be parsed.
    #[error("Malformed input in {}: {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    /// An I/O operation on a specific path failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A conf merge was attempted before the main tree placed its copy.
    #[error("Build conf missing: {}", path.display())]
    MissingBuildConf { path: PathBuf },

    /// A fatal failure that terminates the whole run.
    #[error("Setup error: {message}")]
    Setup { message: String },

    /// An I/O error without path context, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    IoBare(#[from] std::io::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A file watcher error, wrapped from `notify::Error`.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    ///
    /// `ErrorKind::NotFound` is folded into [`Error::NotFound`] so that
    /// callers only have one variant to match for the "missing" class.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }

    /// Whether this error belongs to the "not found" class.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::IoBare(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
