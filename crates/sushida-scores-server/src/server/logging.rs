//! Logging initialization and configuration.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::sync::Mutex;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber based on configuration.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;
    let (writer, ansi) = make_writer(config)?;

    let layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(config.target)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Text, true) => registry.with(layer).try_init(),
        (LogFormat::Text, false) => registry.with(layer.without_time()).try_init(),
        (LogFormat::Json, true) => registry.with(layer.json()).try_init(),
        (LogFormat::Json, false) => registry.with(layer.json().without_time()).try_init(),
    };
    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Pick the output writer and whether it gets ANSI colours.
fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, bool), LoggingError> {
    let json = config.format == LogFormat::Json;
    match config.output.as_str() {
        "stdout" => Ok((
            BoxMakeWriter::new(io::stdout),
            !json && config.color && io::stdout().is_terminal(),
        )),
        "stderr" => Ok((
            BoxMakeWriter::new(io::stderr),
            !json && config.color && io::stderr().is_terminal(),
        )),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LoggingError::FileOpen(path.to_string(), e))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug)]
pub enum LoggingError {
    /// Invalid log filter string.
    InvalidFilter(String),
    /// Failed to open log file.
    FileOpen(String, io::Error),
    /// A global subscriber was already installed.
    AlreadyInitialized(String),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => write!(f, "Invalid log filter: {}", msg),
            LoggingError::FileOpen(path, e) => {
                write!(f, "Failed to open log file '{}': {}", path, e)
            }
            LoggingError::AlreadyInitialized(msg) => {
                write!(f, "Logging already initialized: {}", msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig {
            level: "sushida_scores=loudest".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init(&config), Err(LoggingError::InvalidFilter(_))));
    }

    #[test]
    fn test_unwritable_log_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            output: dir.path().join("missing/dir/server.log").display().to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(make_writer(&config), Err(LoggingError::FileOpen(..))));
    }
}
