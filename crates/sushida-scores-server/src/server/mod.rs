//! HTTP API server for sushida-scores.
//!
//! This module exposes the score repository, its statistics and chart series
//! over a versioned JSON API using axum.

mod config;
mod error;
mod logging;
mod routes;
mod state;

pub use config::{Config, CorsConfig, IngestConfig, LogFormat, LoggingConfig, ServerConfig, StoreConfig};
pub use error::ApiError;
pub use logging::init as init_logging;
pub use routes::router;
pub use state::{AppState, Repository};
