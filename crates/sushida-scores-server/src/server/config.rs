//! Server configuration parsing.

use axum::http::{Method, header};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Server configuration loaded from TOML file.
///
/// Every section is optional; missing values fall back to their defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Score store location.
    #[serde(default)]
    pub store: StoreConfig,
    /// Startup ingestion source.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Cross-origin request policy.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server bind settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1" or "0.0.0.0").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of a built dashboard to serve for non-API paths.
    #[serde(default)]
    pub static_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            static_path: None,
        }
    }
}

/// Score store settings.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Path to the store directory. Created on first start.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Startup ingestion settings.
#[derive(Debug, Default, Deserialize)]
pub struct IngestConfig {
    /// Directory of `*.json` result files merged once at startup and used by
    /// `POST /api/v1/ingest` when the request names no directory.
    #[serde(default)]
    pub directory: Option<String>,
}

/// Cross-origin access for a dashboard served from another origin.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Allowed origins; "*" allows any.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    /// Preflight cache duration in seconds.
    #[serde(default = "default_max_age")]
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_origins: Vec::new(),
            max_age: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// The layer for these settings. Disabled means no cross-origin access.
    ///
    /// Methods and headers are those the API uses; origins that do not parse
    /// as header values are ignored.
    pub fn layer(&self) -> CorsLayer {
        if !self.enabled {
            return CorsLayer::new();
        }

        let origins = if self.allow_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.allow_origins.iter().filter_map(|o| o.parse().ok()))
        };

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(self.max_age))
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "sushida_scores=debug,info".
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// "stdout", "stderr", or a file path to append to.
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_true")]
    pub timestamps: bool,
    #[serde(default = "default_true")]
    pub color: bool,
    /// Include the event target (module path).
    #[serde(default)]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            output: default_output(),
            timestamps: true,
            color: true,
            target: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_store_path() -> String {
    ".sushida-scores".to_string()
}

fn default_max_age() -> u64 {
    3600
}

fn default_level() -> String {
    "info".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Get the socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
