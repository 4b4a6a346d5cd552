//! Tracing setup: stdout always, plus an optional non-blocking log file.

use crate::config::LoggingCfg;
use crate::error::{AppError, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the filter. `RUST_LOG` wins over the configured directive.
fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// When a log file is configured the returned guard must be held until
/// shutdown so buffered lines get flushed.
pub fn init(cfg: &LoggingCfg) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(build_filter(&cfg.filter));

    let (file_layer, guard) = match &cfg.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            fs::create_dir_all(dir)?;

            let file_name = path
                .file_name()
                .ok_or_else(|| AppError::Config(format!("invalid log file path: {}", path.display())))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(build_filter(&cfg.filter));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("failed to install tracing subscriber: {}", e)))?;

    if let Some(path) = &cfg.file {
        tracing::info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}
