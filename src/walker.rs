//! Per-worker traversal logic.
//!
//! A [`Walker`] repeatedly takes a directory from the shared queue, lists it,
//! enqueues its subdirectories and searches its regular files. Between tasks
//! it consults the [`TerminationDetector`] to find out whether the walk is
//! over.

use crate::config::UnreadablePolicy;
use crate::detector::{TerminationDetector, Wake};
use crate::error::{WalkError, WalkResult};
use crate::lister::{DirLister, EntryKind};
use crate::matcher::PatternMatcher;
use crate::queue::TaskQueue;
use crate::report::{Event, EventKind, EventSink};
use crate::stats::WalkStats;
use crate::task::{Task, child_path};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, error, trace, warn};

/// State shared by every worker of one walk.
pub struct WalkContext<'a> {
    pub queue: &'a TaskQueue,
    pub detector: &'a TerminationDetector,
    pub lister: &'a dyn DirLister,
    pub matcher: &'a dyn PatternMatcher,
    pub sink: &'a dyn EventSink,
    pub stats: &'a WalkStats,
    pub max_path_len: usize,
    pub on_unreadable: UnreadablePolicy,
}

pub struct Walker<'a> {
    id: usize,
    ctx: &'a WalkContext<'a>,
}

/// Cancels the walk if the owning worker unwinds, so the others never wait
/// on a status slot that will not change again.
struct CancelOnPanic<'a>(&'a TerminationDetector);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

impl<'a> Walker<'a> {
    pub fn new(id: usize, ctx: &'a WalkContext<'a>) -> Self {
        Self { id, ctx }
    }

    /// Runs until the pool is quiescent or the walk is cancelled.
    ///
    /// Returns the fatal error that made this worker cancel the walk, if any.
    pub fn run(&self) -> WalkResult<()> {
        let _guard = CancelOnPanic(self.ctx.detector);
        debug!(worker = self.id, "worker started");

        loop {
            if self.ctx.detector.should_stop() {
                break;
            }
            match self.ctx.queue.dequeue() {
                Some(task) => {
                    self.ctx.detector.mark_active(self.id);
                    if let Err(e) = self.expand(&task) {
                        error!(worker = self.id, "{e}");
                        self.ctx.detector.cancel();
                        return Err(e);
                    }
                }
                None => match self.ctx.detector.wait_for_work(self.id, self.ctx.queue) {
                    Wake::Retry => continue,
                    Wake::Quiescent | Wake::Cancelled => break,
                },
            }
        }

        debug!(worker = self.id, "worker finished");
        Ok(())
    }

    /// Expands one directory. Only returns an error when the walk must stop:
    /// an unreadable directory under the abort policy, or a closed event sink.
    pub fn expand(&self, task: &Task) -> WalkResult<()> {
        let dir = task.path();
        self.emit(Event::new(self.id, EventKind::Dir, dir))?;

        let entries = match self.ctx.lister.list(dir) {
            Ok(entries) => entries,
            Err(e) => return self.unreadable(dir, e),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), "failed to read entry: {e}");
                    self.emit(Event::error(self.id, dir, e.to_string()))?;
                    continue;
                }
            };

            if entry.kind == EntryKind::Other {
                trace!(dir = %dir.display(), name = ?entry.name, "skipping special entry");
                continue;
            }

            let child = match child_path(dir, &entry.name, self.ctx.max_path_len) {
                Ok(child) => child,
                Err(e) => {
                    self.report_error(dir.join(&entry.name), &e)?;
                    continue;
                }
            };

            match entry.kind {
                EntryKind::Dir => self.enqueue(child)?,
                EntryKind::File => self.search(child)?,
                EntryKind::Other => {}
            }
        }
        Ok(())
    }

    fn enqueue(&self, path: PathBuf) -> WalkResult<()> {
        self.ctx.queue.enqueue(Task::composed(path.clone()));
        self.ctx.detector.notify_work();
        self.emit(Event::new(self.id, EventKind::Enqueue, path))
    }

    fn search(&self, path: PathBuf) -> WalkResult<()> {
        match self.ctx.matcher.is_match(&path) {
            Ok(true) => self.emit(Event::new(self.id, EventKind::Present, path)),
            Ok(false) => self.emit(Event::new(self.id, EventKind::Absent, path)),
            Err(e) => self.report_error(path, &e),
        }
    }

    fn unreadable(&self, dir: &Path, err: WalkError) -> WalkResult<()> {
        self.emit(Event::error(self.id, dir, reason(&err)))?;
        match self.ctx.on_unreadable {
            UnreadablePolicy::Abort => Err(err),
            UnreadablePolicy::Skip => {
                warn!(worker = self.id, "skipping: {err}");
                Ok(())
            }
        }
    }

    fn report_error(&self, path: PathBuf, err: &WalkError) -> WalkResult<()> {
        warn!(worker = self.id, "{err}");
        self.emit(Event::error(self.id, path, reason(err)))
    }

    fn emit(&self, event: Event) -> WalkResult<()> {
        self.ctx.stats.record(self.id, event.kind);
        self.ctx.sink.emit(event).map_err(WalkError::Output)
    }
}

/// Short reason text for an ERROR event; the path is already on the line.
fn reason(err: &WalkError) -> String {
    match err {
        WalkError::PathTooLong { len, max, .. } => {
            format!("path too long ({len} > {max} bytes)")
        }
        WalkError::DirUnreadable { source, .. } | WalkError::Match { source, .. } => {
            source.to_string()
        }
        WalkError::MatcherFailed { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
