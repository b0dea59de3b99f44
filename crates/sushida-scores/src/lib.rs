//! Score tracking for sushida typing results.
//!
//! sushida-scores keeps a date-ordered set of game results, persists it after
//! every change, and derives statistics and chart series from it. Results
//! written by an external tool as JSON files can be merged in idempotently.
//!
//! # Module Organization
//!
//! - [`model`]: Score records and the shapes used to create and patch them
//! - [`repository`]: The record set with its queries and mutations
//! - [`stats`]: Aggregate statistics, global and per course
//! - [`series`]: Chart filtering and per-course time series
//! - [`ordering`]: Table sort keys
//! - [`ingest`]: Loading and merging external result files
//! - [`samples`]: The fixed sample and demo datasets
//! - [`kv`]: Snapshot storage (fjall store behind the `kv` feature)
//! - [`error`]: Unified error types
//! - [`prelude`]: Convenient re-exports
//! - `logging`: Conditional logging macros (internal)
//!
//! # Features
//!
//! - `kv` (default): fjall-backed durable store
//! - `logging`: Enable tracing-based logging
//!
//! # Example
//!
//! ```ignore
//! use sushida_scores::prelude::*;
//!
//! let store = KvStore::open_or_init(".sushida-scores")?;
//! let mut repo = ScoreRepository::open(store)?;
//!
//! repo.seed_samples()?;
//! let stats = repo.statistics_for(Some("お手軽"));
//! println!("{} games, best {}", stats.total_games, stats.best_score);
//! ```

pub mod error;
pub mod ingest;
pub mod kv;
#[macro_use]
pub(crate) mod logging;
pub mod model;
pub mod ordering;
pub mod prelude;
pub mod repository;
pub mod samples;
pub mod series;
pub mod stats;

pub use error::{Error, Result};

#[cfg(feature = "kv")]
pub use kv::KvStore;
pub use kv::{MemoryStorage, Snapshot, Storage, StoreError};

pub use ingest::{ExternalRecord, MergeReport, ScanReport, scan_directory};
pub use model::{ExternalScore, NewScore, ScoreDetail, ScorePatch, ScoreRecord, TypingDetail};
pub use ordering::{SortKey, SortOrder};
pub use repository::{IngestStatus, ScoreRepository};
pub use series::{ChartFilter, DateRange, Series, SeriesPoint};
pub use stats::{CourseStatistics, Statistics};
