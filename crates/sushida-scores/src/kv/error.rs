//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur while loading or saving a snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "kv")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Snapshot checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Corrupted { stored: u32, computed: u32 },

    #[error("Store not initialized at {0}")]
    NotInitialized(String),
}
