//! Library crate for dirgrep
//!
//! `dirgrep` walks a directory tree breadth-first with a fixed pool of worker
//! threads and reports, for every regular file, whether it contains a literal
//! pattern.
//!
//! # Modules
//!
//! - [`queue`]: two-lock FIFO of pending directories
//! - [`detector`]: worker status flags and quiescence detection
//! - [`walker`]: per-worker directory expansion
//! - [`pool`]: thread start-up, join and result folding
//! - [`report`]: event lines and sinks
//! - [`lister`] / [`matcher`]: filesystem enumeration and content search
//! - [`config`] / [`cli`]: configuration and command-line parsing
//! - [`stats`]: run counters and JSON export
//! - [`error`]: error types and exit codes
//!
//! # Example
//!
//! ```no_run
//! use dirgrep::{MemoryReporter, WalkConfig};
//!
//! let config = WalkConfig::new("/var/log", "timeout", 4);
//! let sink = MemoryReporter::new();
//! let summary = dirgrep::search(&config, &sink).unwrap();
//! println!("{} files contain the pattern", summary.present);
//! ```

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod lister;
pub mod matcher;
pub mod pool;
pub mod queue;
pub mod report;
pub mod stats;
pub mod task;
pub mod walker;

pub use cli::Args;
pub use config::{UnreadablePolicy, WalkConfig};
pub use error::{WalkError, WalkResult};
pub use report::{Event, EventKind, EventSink, MemoryReporter, StdoutReporter};
pub use stats::WalkSummary;

use lister::FsLister;
use matcher::build_matcher;
use pool::WorkerPool;
use task::Task;

/// Validates `config` and runs a full walk over the real filesystem,
/// sending every event to `sink`.
pub fn search(config: &WalkConfig, sink: &dyn EventSink) -> WalkResult<WalkSummary> {
    config.validate()?;
    let root = Task::new(config.root.clone(), config.max_path_len)?;
    let matcher = build_matcher(config.matcher, &config.pattern, config.match_mode);
    WorkerPool::from_config(config)?.run(root, &FsLister, matcher.as_ref(), sink)
}
