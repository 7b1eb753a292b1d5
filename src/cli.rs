//! CLI interface definitions for the `dirgrep` application.
//!
//! This module defines command-line arguments using [`clap`] and converts
//! them into a [`WalkConfig`] for the library.
//!
//! # Example
//!
//! ```bash
//! dirgrep 4 ./src needle --on-unreadable skip --stats-json stats.json
//! ```

use crate::config::{DEFAULT_MAX_WORKERS, UnreadablePolicy, WalkConfig};
use crate::matcher::{MatchMode, MatcherKind};
use crate::task::DEFAULT_MAX_PATH_LEN;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments for `dirgrep`.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use dirgrep::Args;
///
/// let args = Args::parse_from(["dirgrep", "2", "/tmp", "needle"]);
/// assert_eq!(args.workers, 2);
/// assert_eq!(args.pattern, "needle");
/// ```
#[derive(Parser, Debug)]
#[command(name = "dirgrep", version, about)]
pub struct Args {
    /// Number of worker threads
    pub workers: usize,

    /// Directory to search
    pub root: PathBuf,

    /// Literal pattern to look for (not a regular expression)
    #[arg(allow_hyphen_values = true)]
    pub pattern: String,

    /// What to do when a directory cannot be opened during the walk
    #[arg(long, value_enum, default_value_t = UnreadablePolicy::Abort)]
    pub on_unreadable: UnreadablePolicy,

    /// Match per line like grep, or as a raw byte sequence
    #[arg(long, value_enum, default_value_t = MatchMode::Lines)]
    pub match_mode: MatchMode,

    /// Search files in-process or through an external `grep -F`
    #[arg(long, value_enum, default_value_t = MatcherKind::Builtin)]
    pub matcher: MatcherKind,

    /// Longest path, in bytes, the walker will build
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PATH_LEN)]
    pub max_path_len: usize,

    /// Upper bound on the worker count (hidden experimental flag)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_WORKERS, hide = true)]
    pub max_workers: usize,

    /// Write run statistics as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub stats_json: Option<PathBuf>,

    /// Print a one-line summary to stderr when done
    #[arg(long, default_value_t = false)]
    pub summary: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the walk configuration, searching from `root` (normally the
    /// canonicalized form of [`Args::root`]).
    pub fn to_config(&self, root: PathBuf) -> WalkConfig {
        WalkConfig::new(root, self.pattern.clone(), self.workers)
            .with_max_workers(self.max_workers)
            .with_unreadable_policy(self.on_unreadable)
            .with_match_mode(self.match_mode)
            .with_matcher(self.matcher)
            .with_max_path_len(self.max_path_len)
    }
}
