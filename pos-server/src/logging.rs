//! Logging Infrastructure
//!
//! Structured logging setup for the order engine. The filter honors
//! `RUST_LOG` when set, falling back to the level passed by the host.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger at the default `info` level
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional daily-rolling file output.
///
/// File output is only enabled when `log_dir` names an existing directory;
/// otherwise log lines go to stderr.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    match log_dir.map(Path::new).filter(|dir| dir.exists()) {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "pos-server");
            subscriber.with_writer(file_appender).init();
        }
        None => subscriber.init(),
    }
}
