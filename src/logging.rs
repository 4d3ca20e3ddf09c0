//! Tracing initialization for binaries and embedders.
//!
//! Environment variables (`RUST_LOG`) take precedence over the configured
//! level. File output goes through a non-blocking appender whose guard
//! lives for the process.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static TRACE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initialize the global tracing subscriber from config.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match &config.file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let name = path.file_name().map_or_else(|| "topostore.log".into(), |n| n.to_os_string());
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = TRACE_GUARD.set(guard);
            if config.json {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(non_blocking)
                    .try_init()
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .try_init()
            }
        }
        None => {
            if config.json {
                tracing_subscriber::fmt().json().with_env_filter(filter).try_init()
            } else {
                tracing_subscriber::fmt().with_env_filter(filter).try_init()
            }
        }
    };
    // A second init (e.g. in tests) is fine.
    let _ = result;
}
