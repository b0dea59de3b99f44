//! Ingestion of results produced by the screenshot extraction tool.
//!
//! Each external result arrives with the name of the file it was read from.
//! The file name supplies both the game date and a deterministic id, so
//! ingesting the same file twice replaces the earlier record instead of
//! duplicating it.

mod filename;
mod scan;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::logging::{debug, trace};
use crate::model::{ExternalScore, ScoreRecord};

pub use filename::{INGEST_ID_PREFIX, date_from_filename, record_id_from_filename, strip_extension};
pub use scan::{ScanReport, SkippedFile, scan_directory};

/// An external result paired with the name of its source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub data: ExternalScore,
    pub filename: String,
}

impl ExternalRecord {
    pub fn new(data: ExternalScore, filename: impl Into<String>) -> Self {
        Self {
            data,
            filename: filename.into(),
        }
    }

    /// Convert to a stored record; undated file names are dated `today`.
    pub fn to_record(&self, today: NaiveDate) -> ScoreRecord {
        let date = date_from_filename(&self.filename, today);
        self.data
            .clone()
            .dated(date)
            .with_id(record_id_from_filename(&self.filename))
    }
}

/// Counts from one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    /// Records appended because their id was new.
    pub inserted: usize,
    /// Records that replaced an existing record with the same id.
    pub replaced: usize,
}

impl MergeReport {
    pub fn total(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Merge `batch` into `scores`, then sort everything by date.
///
/// A converted record replaces the existing record with the same id in place;
/// otherwise it is appended. The final sort is stable.
pub fn merge(scores: &mut Vec<ScoreRecord>, batch: &[ExternalRecord], today: NaiveDate) -> MergeReport {
    let mut report = MergeReport::default();

    for external in batch {
        let record = external.to_record(today);
        match scores.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                trace!(id = %record.id, "replacing ingested score");
                *existing = record;
                report.replaced += 1;
            }
            None => {
                trace!(id = %record.id, "appending ingested score");
                scores.push(record);
                report.inserted += 1;
            }
        }
    }

    scores.sort_by_key(|r| r.date);
    debug!(inserted = report.inserted, replaced = report.replaced, "merged ingested scores");
    report
}
