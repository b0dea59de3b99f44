//! Ingestion of result files written by the extraction tool.

use std::path::{Path, PathBuf};

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use sushida_scores::ingest::{SkippedFile, scan_directory};
use sushida_scores::model::today;
use sushida_scores::IngestStatus;

use super::super::{error::ApiError, state::AppState};

/// Request body for an on-demand ingestion.
#[derive(Debug, Deserialize, Default)]
pub struct IngestRequest {
    /// Directory to scan. Must lie inside the configured directory; the
    /// configured directory itself when absent.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Outcome of an on-demand ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Scan a result directory and merge its files.
///
/// An empty body uses the configured directory. Paths outside it are refused.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn ingest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let request: IngestRequest = if body.is_empty() {
        IngestRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?
    };
    let configured = state.ingest_dir().ok_or_else(ApiError::ingest_not_configured)?;
    let directory = resolve_directory(configured, request.directory)?;

    let report = scan_directory(&directory)?;
    for skipped in &report.skipped {
        warn!(file = %skipped.filename, reason = %skipped.reason, "skipped result file");
    }

    let merged = state.write().await.ingest(&report.records, today())?;
    info!(
        directory = %directory.display(),
        inserted = merged.inserted,
        replaced = merged.replaced,
        "ingested result files"
    );

    Ok(Json(IngestResponse {
        inserted: merged.inserted,
        replaced: merged.replaced,
        skipped: report.skipped,
    }))
}

/// The directory to scan: `requested` if it resolves inside `configured`.
fn resolve_directory(configured: &Path, requested: Option<PathBuf>) -> Result<PathBuf, ApiError> {
    let Some(requested) = requested else {
        return Ok(configured.to_path_buf());
    };
    let inside = match (configured.canonicalize(), requested.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    };
    if !inside {
        warn!(directory = %requested.display(), "ingestion outside configured directory refused");
        return Err(ApiError::ingest_directory_forbidden(&requested));
    }
    Ok(requested)
}

/// State of the one-time startup ingestion.
#[instrument(skip(state))]
pub async fn ingest_status(State(state): State<AppState>) -> Json<IngestStatus> {
    Json(state.read().await.ingest_status().clone())
}
