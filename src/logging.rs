//! Tracing setup.
//!
//! The TUI owns stdout, so logs go to a daily-rolling file.  Only errors reach
//! stderr unless `--verbose` is given.  `RUST_LOG` overrides the default filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "diary_reader=info";
const LOG_FILE_NAME: &str = "diary-reader.log";

/// Install the global subscriber.
///
/// Returns the file writer's guard, which must live until exit so buffered
/// lines get flushed.  `None` if the log directory could not be created; the
/// reader then runs without file logging.
pub fn init(log_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter.clone());
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Warning: failed to create log directory {}: {e}", log_dir.display());
            (None, None)
        }
    };

    let console_filter = if verbose {
        env_filter
    } else {
        EnvFilter::new("error")
    };
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
