//! Run-level error types.
//!
//! Only [`ConfigError`] aborts a run, and it is always raised before the first
//! directory is read. [`ScanError`] is collected per subtree and surfaced in the
//! final report; per-file network failures live in
//! [`crate::contract::FailureReason`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} pattern `{pattern}`: {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid repository url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("repository root {} is not a readable directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("at least one repository root is required")]
    NoRoots,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// A directory (and everything below it) that could not be read.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("failed to scan {}: {message}", .path.display())]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

impl ScanError {
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        ScanError {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let message = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };
        ScanError { path, message }
    }
}
