//! Convenient re-exports for common usage.
//!
//! ```ignore
//! use sushida_scores::prelude::*;
//! ```

pub use crate::error::{Error, Result};

#[cfg(feature = "kv")]
pub use crate::kv::KvStore;
pub use crate::kv::{MemoryStorage, Snapshot, Storage, StoreError};

pub use crate::ingest::{ExternalRecord, MergeReport, ScanReport, scan_directory};
pub use crate::model::{
    ExternalScore, NewScore, ScoreDetail, ScorePatch, ScoreRecord, TypingDetail, parse_date, today,
};
pub use crate::ordering::{SortKey, SortOrder, sort_records};
pub use crate::repository::{IngestStatus, ScoreRepository};
pub use crate::series::{ChartFilter, DateRange, Series, SeriesPoint};
pub use crate::stats::{CourseStatistics, Statistics};
