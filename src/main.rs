//! Main entry point for the `dirgrep` CLI application.
//!
//! `dirgrep WORKERS ROOT PATTERN` searches every regular file under `ROOT`
//! for a literal pattern using `WORKERS` threads, printing one event line
//! per action to stdout:
//!
//! ```text
//! [0] DIR /data
//! [0] ENQUEUE /data/sub
//! [1] PRESENT /data/a.txt
//! ```
//!
//! # Exit status
//! - `0` on success, and on usage or validation errors (nothing was walked)
//! - `1` when the walk was aborted by a fatal error, including stdout being
//!   closed before the walk finished
//!
//! Logs go to stderr, controlled by `-v` or `RUST_LOG`.

use anyhow::{Context, Result};
use clap::Parser;
use dirgrep::config::resolve_root;
use dirgrep::error::{EXIT_FATAL, EXIT_OK};
use dirgrep::stats::{print_summary, save_stats_json};
use dirgrep::{Args, StdoutReporter, WalkError};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "dirgrep=warn",
        1 => "dirgrep=info",
        _ => "dirgrep=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let root = resolve_root(&args.root)?;
    let config = args.to_config(root);

    let summary = dirgrep::search(&config, &StdoutReporter)?;

    if args.summary {
        print_summary(&summary);
    }
    if let Some(path) = &args.stats_json {
        save_stats_json(path, &summary)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help, version and usage errors all end here without walking.
            let _ = e.print();
            return ExitCode::from(EXIT_OK);
        }
    };

    setup_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            eprintln!("dirgrep: {e:#}");
            let code = e
                .downcast_ref::<WalkError>()
                .map(WalkError::exit_code)
                .unwrap_or(EXIT_FATAL);
            ExitCode::from(code)
        }
    }
}
