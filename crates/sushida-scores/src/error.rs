//! Unified error type for the sushida-scores library.
//!
//! Storage failures, input normalization failures and rejected writes all
//! surface through [`Error`], so callers can use a single `?` chain.

use thiserror::Error;

use crate::kv::StoreError;

/// Errors returned by repository, ingestion and parsing operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the durable snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A date string could not be read as a `YYYY-MM-DD` calendar date.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    /// Manually entered JSON did not match the score shape.
    #[error("invalid score JSON: {0}")]
    InvalidJson(String),

    /// A score field held a value that cannot be stored, such as a NaN TPS.
    #[error("invalid score: {0}")]
    InvalidScore(String),

    /// A write was attempted while the demo dataset is active.
    #[error("demo mode is active; scores are read-only")]
    DemoModeActive,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }

    /// Returns `true` if this is a storage error.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns `true` if the caller supplied malformed input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate { .. } | Self::InvalidJson(_) | Self::InvalidScore(_)
        )
    }

    /// Returns `true` if the write was rejected because demo mode is on.
    pub fn is_demo_mode(&self) -> bool {
        matches!(self, Self::DemoModeActive)
    }
}
