//! # Observability
//!
//! Logging layer shared by every wiki-sync crate.
//!
//! Library code only uses `tracing` macros. The binary calls
//! [`init_with_config`] once at startup and decides where records go:
//!
//! - a compact, human readable stream on stderr
//! - optionally, a JSONL run log (one object per line) that can be kept next
//!   to the batch job's other artifacts and inspected with `jq`
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "wiki-sync".into(),
//!     default_level: "debug".into(),
//!     log_path: Some("sync-run.jsonl".into()),
//!     ..Default::default()
//! });
//! tracing::info!(pages = 3, "sync finished");
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use file_sink::{LogFileWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every JSONL line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional JSONL log file. No file layer is installed when unset.
    pub log_path: Option<PathBuf>,

    /// Emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Initialize the observability layer with custom configuration.
///
/// If the JSONL file cannot be opened, logging falls back to stderr only and
/// a warning is emitted once the subscriber is installed.
pub fn init_with_config(config: LogConfig) {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let (file_layer, file_error) = match &config.log_path {
        Some(path) => match LogFileWriter::new(path) {
            Ok(writer) => {
                let layer = JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer));
                (Some(layer.with_filter(filter())), None)
            }
            Err(e) => (None, Some((path.clone(), e))),
        },
        None => (None, None),
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(filter())
    });

    // try_init: tests and embedding callers may have installed a subscriber already.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    match (&config.log_path, file_error) {
        (_, Some((path, e))) => {
            tracing::warn!(log_path = %path.display(), error = %e, "could not open log file");
        }
        (Some(path), None) => {
            tracing::debug!(log_path = %path.display(), "observability initialized");
        }
        (None, None) => {}
    }
}
