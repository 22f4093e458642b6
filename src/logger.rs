//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the config is loaded. Logs go to
//! stderr so stdout stays parseable for `cookbook export` and `--json`.

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unrecognised log level: '{0}'")]
    InvalidLevel(String),

    #[error("failed to set subscriber: {0}")]
    Install(String),
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set and valid; `level` is the fallback.
pub fn init(level: &str) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|_| LoggerError::InvalidLevel(level.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))?;

    Ok(())
}

/// Parse a log level string, rejecting anything tracing does not know.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    if level.is_empty() {
        return Err(LoggerError::InvalidLevel(level.to_string()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| LoggerError::InvalidLevel(level.to_string()))
}
