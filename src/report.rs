//! Event reporting.
//!
//! Every observed action becomes one [`Event`], rendered as a single line
//! `[<worker>] <KIND> <path>`. Sinks must write each line in one call so
//! lines from different workers never interleave mid-line.

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

/// The kind of an event.
///
/// # Variants
/// * `Dir` - a worker started expanding a directory
/// * `Enqueue` - a subdirectory was added to the task queue
/// * `Present` / `Absent` - a regular file was searched
/// * `Error` - a per-entry failure that was reported and skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Dir,
    Enqueue,
    Present,
    Absent,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Dir => "DIR",
            EventKind::Enqueue => "ENQUEUE",
            EventKind::Present => "PRESENT",
            EventKind::Absent => "ABSENT",
            EventKind::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub worker: usize,
    pub kind: EventKind,
    pub path: PathBuf,
    /// Reason text, only set for [`EventKind::Error`].
    pub detail: Option<String>,
}

impl Event {
    pub fn new(worker: usize, kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            worker,
            kind,
            path: path.into(),
            detail: None,
        }
    }

    pub fn error(worker: usize, path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self {
            worker,
            kind: EventKind::Error,
            path: path.into(),
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.worker,
            self.kind.as_str(),
            self.path.display()
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Receives events from all workers concurrently.
///
/// A failed `emit` means the event log is gone; the walker treats it as
/// fatal and cancels the walk.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event) -> io::Result<()>;
}

/// Writes one line per event to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl EventSink for StdoutReporter {
    fn emit(&self, event: Event) -> io::Result<()> {
        let line = format!("{event}\n");
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

/// Collects events in memory, for library callers and tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events.into_inner()
    }
}

impl EventSink for MemoryReporter {
    fn emit(&self, event: Event) -> io::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}
