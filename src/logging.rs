//! Tracing setup.
//!
//! The TUI owns stdout/stderr, so log records go to daily rolling files
//! under the user cache directory, keeping the last week. Filter with
//! `CLIPPYCLI_LOG` (same syntax as `RUST_LOG`).

use crate::config::Config;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CLIPPYCLI_LOG";
const DEFAULT_FILTER: &str = "clippycli=info,reqwest=warn";
const LOG_PREFIX: &str = "clippycli";
const MAX_LOG_FILES: usize = 7;

/// Install the global subscriber. Logging is skipped if the log directory
/// can't be used.
///
/// The returned guard flushes buffered records when dropped, so keep it
/// alive for the whole run.
pub fn init() -> Option<WorkerGuard> {
    let dir = Config::log_dir()?;
    let appender = file_appender(&dir).ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}

/// Daily `clippycli.<date>.log` files; older ones beyond
/// [`MAX_LOG_FILES`] are deleted on rotation.
fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    let _ = fs::create_dir_all(dir);
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
}
