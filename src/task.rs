//! Directory tasks and path composition.
//!
//! A [`Task`] is one directory path waiting to be expanded. Paths are stored
//! as owned [`PathBuf`]s and checked against a configurable byte limit every
//! time one is built, so an oversized path is rejected instead of truncated.

use crate::error::{WalkError, WalkResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Default maximum path length in bytes (one less than Linux `PATH_MAX`).
pub const DEFAULT_MAX_PATH_LEN: usize = 4095;

/// A pending directory awaiting expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    path: PathBuf,
}

impl Task {
    /// Wraps `path`, rejecting it if it is longer than `max_len` bytes.
    pub fn new(path: impl Into<PathBuf>, max_len: usize) -> WalkResult<Self> {
        let path = path.into();
        check_len(&path, max_len)?;
        Ok(Self { path })
    }

    /// Wraps a path already length-checked by [`child_path`].
    pub(crate) fn composed(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Builds `parent/name`, failing with [`WalkError::PathTooLong`] when the
/// result would exceed `max_len` bytes.
pub fn child_path(parent: &Path, name: &OsStr, max_len: usize) -> WalkResult<PathBuf> {
    let child = parent.join(name);
    check_len(&child, max_len)?;
    Ok(child)
}

fn check_len(path: &Path, max_len: usize) -> WalkResult<()> {
    let len = path.as_os_str().len();
    if len > max_len {
        return Err(WalkError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max: max_len,
        });
    }
    Ok(())
}
