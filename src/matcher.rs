//! Literal pattern matching against file contents.
//!
//! Two implementations of [`PatternMatcher`] are provided:
//! - [`LiteralMatcher`], an in-process search built on `memchr::memmem`.
//!   Small files are read whole, large ones are memory-mapped.
//! - [`GrepMatcher`], which runs an external `grep -q -F` with an explicit
//!   argument vector. The pattern is passed as a single argument and never
//!   reaches a shell.

use crate::error::{WalkError, WalkResult};
use clap::ValueEnum;
use memchr::memmem::Finder;
use memmap2::Mmap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::trace;

/// Files at or above this size are memory-mapped instead of read.
pub const MMAP_THRESHOLD: u64 = 4 * 1024 * 1024;

/// How a literal pattern is matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// grep-style: the pattern is a newline-separated list of literals and a
    /// file matches when any of its lines contains one of them. An empty
    /// literal matches any line, so it matches every non-empty file.
    Lines,
    /// The whole pattern must occur as a contiguous byte sequence. An empty
    /// pattern matches every file.
    Bytes,
}

/// Which matcher implementation to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MatcherKind {
    Builtin,
    Grep,
}

/// Tests whether a file contains the search pattern.
pub trait PatternMatcher: Send + Sync {
    fn is_match(&self, path: &Path) -> WalkResult<bool>;
}

pub struct LiteralMatcher {
    finders: Vec<Finder<'static>>,
    any_line: bool,
}

impl LiteralMatcher {
    pub fn new(pattern: &str, mode: MatchMode) -> Self {
        let literals: Vec<&str> = match mode {
            MatchMode::Bytes => vec![pattern],
            MatchMode::Lines => pattern.split('\n').collect(),
        };
        let any_line = mode == MatchMode::Lines && literals.iter().any(|l| l.is_empty());
        let finders = literals
            .iter()
            .filter(|l| mode == MatchMode::Bytes || !l.is_empty())
            .map(|l| Finder::new(l.as_bytes()).into_owned())
            .collect();
        Self { finders, any_line }
    }

    /// Matches against an in-memory buffer.
    pub fn matches_bytes(&self, haystack: &[u8]) -> bool {
        if self.any_line && !haystack.is_empty() {
            return true;
        }
        self.finders.iter().any(|f| f.find(haystack).is_some())
    }
}

impl PatternMatcher for LiteralMatcher {
    fn is_match(&self, path: &Path) -> WalkResult<bool> {
        let mut file = File::open(path).map_err(|e| WalkError::matching(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| WalkError::matching(path, e))?
            .len();

        if len >= MMAP_THRESHOLD {
            trace!(path = %path.display(), len, "memory-mapping file");
            // SAFETY: the mapping is read-only and dropped before returning.
            // Concurrent truncation by another process can fault, the same
            // trade-off every mmap-based searcher makes.
            let map = unsafe { Mmap::map(&file) }.map_err(|e| WalkError::matching(path, e))?;
            Ok(self.matches_bytes(&map))
        } else {
            let mut bytes = Vec::with_capacity(len as usize);
            file.read_to_end(&mut bytes).map_err(|e| WalkError::matching(path, e))?;
            Ok(self.matches_bytes(&bytes))
        }
    }
}

/// Delegates to an external `grep`, which always has line semantics.
pub struct GrepMatcher {
    program: OsString,
    pattern: String,
}

impl GrepMatcher {
    pub fn new(pattern: &str) -> Self {
        Self::with_program("grep", pattern)
    }

    pub fn with_program(program: impl Into<OsString>, pattern: &str) -> Self {
        Self {
            program: program.into(),
            pattern: pattern.to_string(),
        }
    }
}

impl PatternMatcher for GrepMatcher {
    fn is_match(&self, path: &Path) -> WalkResult<bool> {
        let output = Command::new(&self.program)
            .arg("-q")
            .arg("-F")
            .arg("-e")
            .arg(&self.pattern)
            .arg("--")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| WalkError::matching(path, e))?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(WalkError::MatcherFailed {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Builds the configured matcher.
pub fn build_matcher(kind: MatcherKind, pattern: &str, mode: MatchMode) -> Box<dyn PatternMatcher> {
    match kind {
        MatcherKind::Builtin => Box::new(LiteralMatcher::new(pattern, mode)),
        MatcherKind::Grep => Box::new(GrepMatcher::new(pattern)),
    }
}
