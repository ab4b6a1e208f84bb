//! Logging initialization for wiki-sync.
//!
//! Thin wrapper over the observability crate: compact logs on stderr and,
//! when requested, a JSONL run log.

use observability::LogConfig;
use std::path::PathBuf;

const SERVICE_NAME: &str = "wiki-sync";

/// Initialize the logging system.
///
/// `WIKI_SYNC_LOG_LEVEL` overrides `level`; `RUST_LOG` still takes precedence
/// over both as a full filter directive.
///
/// ```ignore
/// init_logging("info", None);
/// tracing::info!("sync started");
/// ```
pub fn init_logging(level: &str, log_file: Option<PathBuf>) {
    let level = std::env::var("WIKI_SYNC_LOG_LEVEL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.to_string());

    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: parse_level(&level).to_string().to_lowercase(),
        log_path: log_file,
        also_stderr: true,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
