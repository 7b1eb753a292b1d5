//! Error types for `dirgrep`.
//!
//! Errors fall into three groups:
//! - setup errors (bad worker count, missing root) raised before any worker starts
//! - per-entry errors (path too long, matcher I/O failure) reported as events
//! - fatal traversal errors (unreadable directory under the abort policy,
//!   a closed event output, worker spawn or panic) that stop the whole pool

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type WalkResult<T> = Result<T, WalkError>;

/// Exit status for a clean run, and for usage or validation errors.
pub const EXIT_OK: u8 = 0;

/// Exit status when traversal was aborted by a fatal error.
pub const EXIT_FATAL: u8 = 1;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("worker count must be between 1 and {max}, got {got}")]
    InvalidWorkerCount { got: usize, max: usize },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("cannot resolve root path {path}: {source}")]
    RootUnresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path of {len} bytes exceeds the maximum of {max}: {path}")]
    PathTooLong { path: PathBuf, len: usize, max: usize },

    #[error("cannot open directory {path}: {source}")]
    DirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot search {path}: {source}")]
    Match {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external matcher failed on {path}: {reason}")]
    MatcherFailed { path: PathBuf, reason: String },

    #[error("failed to spawn worker {id}: {source}")]
    WorkerSpawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write event: {0}")]
    Output(#[source] std::io::Error),

    #[error("worker {id} panicked")]
    WorkerPanicked { id: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WalkError {
    pub fn dir_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirUnreadable {
            path: path.into(),
            source,
        }
    }

    pub fn matching(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Match {
            path: path.into(),
            source,
        }
    }

    /// Errors raised while validating input, before any worker has started.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            WalkError::InvalidWorkerCount { .. }
                | WalkError::NoWorkers
                | WalkError::RootNotFound(_)
                | WalkError::RootNotDirectory(_)
                | WalkError::RootUnresolvable { .. }
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_usage() { EXIT_OK } else { EXIT_FATAL }
    }
}
