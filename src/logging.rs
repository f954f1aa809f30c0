//! File-based tracing setup for host applications

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize a JSON file logger for the crate.
///
/// Writes to `<dir>/<file_name>` through a non-blocking appender and filters
/// via `RUST_LOG` (default `info`). Returns the appender guard; the caller
/// must keep it alive for the lifetime of the process or buffered log lines
/// are dropped on exit. Safe to call when a global subscriber is already set:
/// the existing subscriber wins and the guard is still returned.
pub fn init(dir: &Path, file_name: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(dir, file_name.to_string());
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    guard
}
