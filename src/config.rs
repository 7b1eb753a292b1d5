//! Validated walk configuration.
//!
//! [`WalkConfig`] is what the library runs on. The CLI builds one from
//! [`crate::cli::Args`]; library callers build it directly.

use crate::error::{WalkError, WalkResult};
use crate::matcher::{MatchMode, MatcherKind};
use crate::task::{DEFAULT_MAX_PATH_LEN, Task};
use clap::ValueEnum;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default upper bound on the worker count.
///
/// All workers share one status lock, and past a handful of threads the
/// contention on it outweighs the extra parallelism.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// What to do when a directory cannot be opened mid-walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnreadablePolicy {
    /// Cancel the whole walk and fail with the error.
    Abort,
    /// Report an ERROR event for the directory and keep going.
    Skip,
}

/// Canonicalizes the root given on the command line.
///
/// A missing root is `RootNotFound`; any other failure (permissions, a file
/// used as a path component) keeps its io error.
pub fn resolve_root(path: &Path) -> WalkResult<PathBuf> {
    path.canonicalize().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => WalkError::RootNotFound(path.to_path_buf()),
        _ => WalkError::RootUnresolvable {
            path: path.to_path_buf(),
            source,
        },
    })
}

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub root: PathBuf,
    pub pattern: String,
    pub workers: usize,
    pub max_workers: usize,
    pub on_unreadable: UnreadablePolicy,
    pub match_mode: MatchMode,
    pub matcher: MatcherKind,
    pub max_path_len: usize,
}

impl WalkConfig {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>, workers: usize) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
            workers,
            max_workers: DEFAULT_MAX_WORKERS,
            on_unreadable: UnreadablePolicy::Abort,
            match_mode: MatchMode::Lines,
            matcher: MatcherKind::Builtin,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_unreadable_policy(mut self, policy: UnreadablePolicy) -> Self {
        self.on_unreadable = policy;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_matcher(mut self, matcher: MatcherKind) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_max_path_len(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }

    /// Checks everything that must hold before a worker is started.
    pub fn validate(&self) -> WalkResult<()> {
        if self.workers == 0 || self.workers > self.max_workers {
            return Err(WalkError::InvalidWorkerCount {
                got: self.workers,
                max: self.max_workers,
            });
        }
        if !self.root.exists() {
            return Err(WalkError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(WalkError::RootNotDirectory(self.root.clone()));
        }
        Task::new(self.root.clone(), self.max_path_len)?;

        let cpus = num_cpus::get();
        if self.workers > cpus {
            info!(workers = self.workers, cpus, "more workers than CPUs");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let resolved = resolve_root(temp.path()).unwrap();
        assert!(resolved.is_absolute());

        let err = resolve_root(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, WalkError::RootNotFound(_)));

        // A regular file used as a directory is not a missing root.
        let err = resolve_root(&file.join("below")).unwrap_err();
        assert!(matches!(err, WalkError::RootUnresolvable { .. }));
        assert!(err.is_usage());
    }

    #[test]
    fn test_defaults() {
        let config = WalkConfig::new("/tmp", "x", 2);
        assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
        assert_eq!(config.on_unreadable, UnreadablePolicy::Abort);
        assert_eq!(config.match_mode, MatchMode::Lines);
        assert_eq!(config.matcher, MatcherKind::Builtin);
        assert_eq!(config.max_path_len, DEFAULT_MAX_PATH_LEN);
    }

    #[test]
    fn test_worker_bounds() {
        let temp = TempDir::new().unwrap();
        for bad in [0, 9] {
            let err = WalkConfig::new(temp.path(), "x", bad).validate().unwrap_err();
            assert!(matches!(err, WalkError::InvalidWorkerCount { .. }));
        }
        for good in [1, 8] {
            WalkConfig::new(temp.path(), "x", good).validate().unwrap();
        }
        WalkConfig::new(temp.path(), "x", 16)
            .with_max_workers(16)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_root_must_be_existing_dir() {
        let temp = TempDir::new().unwrap();
        let err = WalkConfig::new(temp.path().join("missing"), "x", 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, WalkError::RootNotFound(_)));

        let file = temp.path().join("f");
        std::fs::write(&file, "").unwrap();
        let err = WalkConfig::new(&file, "x", 1).validate().unwrap_err();
        assert!(matches!(err, WalkError::RootNotDirectory(_)));
    }

    #[test]
    fn test_root_longer_than_limit() {
        let temp = TempDir::new().unwrap();
        let err = WalkConfig::new(temp.path(), "x", 1)
            .with_max_path_len(1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, WalkError::PathTooLong { .. }));
    }
}
