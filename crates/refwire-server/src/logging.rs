//! Console plus optional rolling-file logging.
//!
//! Two daily files are written when a log directory is set: one with every
//! event the filter lets through, one with warnings and errors only.

use std::path::Path;

use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::ServerError;

const INFO_LOG: &str = "refwire.log";
const ERROR_LOG: &str = "refwire.error.log";

/// Keeps the file writers flushing; drop it only at shutdown.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init(log_dir: Option<&Path>) -> Result<LogGuard, ServerError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let mut guards = Vec::new();
    let (info_layer, error_layer) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| ServerError::LogDir {
                path: dir.to_path_buf(),
                source,
            })?;

            let (info_writer, info_guard) = non_blocking(rolling::daily(dir, INFO_LOG));
            let (error_writer, error_guard) = non_blocking(rolling::daily(dir, ERROR_LOG));
            guards.push(info_guard);
            guards.push(error_guard);

            (
                Some(fmt::layer().with_ansi(false).with_writer(info_writer)),
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(error_writer)
                        .with_filter(LevelFilter::WARN),
                ),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(error_layer)
        .try_init()
        .map_err(|error| ServerError::Logging(error.to_string()))?;

    if let Some(dir) = log_dir {
        info!(dir = %dir.display(), "file logging enabled");
    }
    Ok(LogGuard { _guards: guards })
}
