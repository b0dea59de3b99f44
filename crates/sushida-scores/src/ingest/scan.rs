//! Collecting extraction results from a directory of JSON files.

use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::Result;
use crate::logging::{debug, info, warn};
use crate::model::ExternalScore;

use super::ExternalRecord;

/// A file that was found but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Result of scanning a directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Parsed results, ordered by file name.
    pub records: Vec<ExternalRecord>,
    pub skipped: Vec<SkippedFile>,
}

/// Read every `*.json` file directly inside `dir`.
///
/// A missing directory yields an empty report. Files that cannot be read or
/// parsed are listed in [`ScanReport::skipped`] and do not stop the scan.
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<ScanReport> {
    let dir = dir.as_ref();
    let mut report = ScanReport::default();

    if !dir.is_dir() {
        warn!(dir = %dir.display(), "score directory not found, nothing to ingest");
        return Ok(report);
    }

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let filename = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(file = %filename, error = %e, "skipping unreadable entry");
                report.skipped.push(SkippedFile {
                    filename,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<ExternalScore>(&text).map_err(|e| e.to_string())
            })
            .and_then(|data| {
                data.typing.validate().map_err(|e| e.to_string())?;
                Ok(data)
            });

        match parsed {
            Ok(data) => {
                debug!(file = %filename, "loaded score file");
                report.records.push(ExternalRecord { data, filename });
            }
            Err(reason) => {
                warn!(file = %filename, reason = %reason, "skipping invalid score file");
                report.skipped.push(SkippedFile { filename, reason });
            }
        }
    }

    info!(
        dir = %dir.display(),
        loaded = report.records.len(),
        skipped = report.skipped.len(),
        "scanned score directory"
    );
    Ok(report)
}
