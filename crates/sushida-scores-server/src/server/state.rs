//! Application state management.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use sushida_scores::ingest::scan_directory;
use sushida_scores::model::today;
use sushida_scores::{KvStore, ScoreRepository};

use super::config::Config;

/// The repository type served by the API.
pub type Repository = ScoreRepository<KvStore>;

/// Shared application state.
///
/// One repository behind a read-write lock: queries share it, mutations
/// take it exclusively, so every request sees a consistent record set.
#[derive(Clone)]
pub struct AppState {
    repo: Arc<RwLock<Repository>>,
    ingest_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let path = Path::new(&config.store.path);
        let store = KvStore::open_or_init(path).map_err(|e| StateError::OpenStore {
            path: config.store.path.clone(),
            source: e.into(),
        })?;
        let repo = ScoreRepository::open(store).map_err(|e| StateError::OpenStore {
            path: config.store.path.clone(),
            source: e,
        })?;

        Ok(Self::new(repo, config.ingest.directory.as_ref().map(PathBuf::from)))
    }

    pub fn new(repo: Repository, ingest_dir: Option<PathBuf>) -> Self {
        Self {
            repo: Arc::new(RwLock::new(repo)),
            ingest_dir,
        }
    }

    /// Shared access for queries.
    pub async fn read(&self) -> RwLockReadGuard<'_, Repository> {
        self.repo.read().await
    }

    /// Exclusive access for mutations.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Repository> {
        self.repo.write().await
    }

    /// The configured ingestion directory, if any.
    pub fn ingest_dir(&self) -> Option<&Path> {
        self.ingest_dir.as_deref()
    }

    /// Merge the configured result directory once.
    ///
    /// Failures are recorded in the repository's ingest status and logged;
    /// the server keeps running with whatever it already stored.
    pub async fn ingest_on_startup(&self) {
        let mut repo = self.write().await;
        let Some(dir) = self.ingest_dir.as_deref() else {
            if let Err(e) = repo.ingest_once(&[], today()) {
                warn!(error = %e, "startup ingestion failed");
            }
            return;
        };

        let report = match scan_directory(dir) {
            Ok(report) => report,
            Err(e) => {
                repo.fail_ingest(e.to_string());
                return;
            }
        };
        for skipped in &report.skipped {
            warn!(file = %skipped.filename, reason = %skipped.reason, "skipped result file");
        }

        match repo.ingest_once(&report.records, today()) {
            Ok(Some(merged)) => info!(
                directory = %dir.display(),
                inserted = merged.inserted,
                replaced = merged.replaced,
                skipped = report.skipped.len(),
                "loaded result files"
            ),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "startup ingestion failed"),
        }
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// Failed to open or initialize the score store.
    OpenStore {
        path: String,
        source: sushida_scores::Error,
    },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::OpenStore { path, source } => {
                write!(f, "Failed to open score store at '{}': {}", path, source)
            }
        }
    }
}

impl std::error::Error for StateError {}
