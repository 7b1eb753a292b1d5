//! Directory enumeration.
//!
//! [`DirLister`] is the seam between the walker and the filesystem. The
//! default [`FsLister`] reads entries with `std::fs::read_dir` and classifies
//! them without following symbolic links.

use crate::error::{WalkError, WalkResult};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Kind of a directory entry, as far as the walker cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Symlinks, devices, sockets, FIFOs. Skipped by the walker.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// Produces the entries of one directory.
///
/// The returned iterator may yield per-entry I/O errors; failing to open the
/// directory itself is reported as [`WalkError::DirUnreadable`].
pub trait DirLister: Send + Sync {
    fn list<'a>(
        &'a self,
        dir: &Path,
    ) -> WalkResult<Box<dyn Iterator<Item = std::io::Result<ListedEntry>> + 'a>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list<'a>(
        &'a self,
        dir: &Path,
    ) -> WalkResult<Box<dyn Iterator<Item = std::io::Result<ListedEntry>> + 'a>> {
        let entries = fs::read_dir(dir).map_err(|e| WalkError::dir_unreadable(dir, e))?;
        Ok(Box::new(entries.map(|entry| {
            let entry = entry?;
            // DirEntry::file_type does not follow symlinks.
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            Ok(ListedEntry {
                name: entry.file_name(),
                kind,
            })
        })))
    }
}
