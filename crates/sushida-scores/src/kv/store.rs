//! Snapshot storage backed by fjall.

use std::path::Path;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::logging::{debug, error, info, trace, warn};

use super::Storage;
use super::error::StoreError;
use super::types::Snapshot;

/// Key of the store version in the metadata keyspace.
const META_CONFIG_KEY: &str = "config";

/// Keyspace holding the score snapshot.
const SCORES_KEYSPACE: &str = "scores";

/// Name of the snapshot blob.
const SNAPSHOT_KEY: &str = "typing-game-scores";

/// Key of the crc32 of the snapshot blob.
const SNAPSHOT_CRC_KEY: &str = "typing-game-scores.crc";

/// Current store version.
/// Increment this when changing the on-disk layout.
/// The store will reject opening databases with a different version.
const STORE_VERSION: u32 = 1;

/// Durable score storage in a fjall database.
///
/// The whole repository state is one JSON blob under a fixed key, written
/// with its crc32 and synced to disk before `save` returns.
///
/// # Example
///
/// ```ignore
/// use sushida_scores::{KvStore, ScoreRepository};
///
/// let store = KvStore::open_or_init(".sushida-scores")?;
/// let mut repo = ScoreRepository::open(store)?;
/// println!("{} scores", repo.records().len());
/// ```
pub struct KvStore {
    db: fjall::Database,
    scores: Keyspace,
}

impl KvStore {
    /// Open an existing store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening score store");

        if !path.exists() {
            error!(path = %path.display(), "store path does not exist");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        }

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;

        let Some(config) = meta.get(META_CONFIG_KEY)? else {
            error!(path = %path.display(), "store not initialized - no config found");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        };

        let version = u32::from_le_bytes(
            config
                .as_ref()
                .try_into()
                .map_err(|_| StoreError::InvalidFormat("Invalid config format".to_string()))?,
        );
        if version != STORE_VERSION {
            error!(
                stored_version = version,
                expected_version = STORE_VERSION,
                "store version mismatch"
            );
            return Err(StoreError::InvalidFormat(format!(
                "Store version mismatch: expected {}, got {}",
                STORE_VERSION, version
            )));
        }
        trace!(version = version, "store version verified");

        let scores = db.keyspace(SCORES_KEYSPACE, KeyspaceCreateOptions::default)?;

        info!(path = %path.display(), "score store opened");
        Ok(Self { db, scores })
    }

    /// Initialize a new store at the given path.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "initializing score store");

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;
        meta.insert(META_CONFIG_KEY, STORE_VERSION.to_le_bytes())?;
        let scores = db.keyspace(SCORES_KEYSPACE, KeyspaceCreateOptions::default)?;
        db.persist(PersistMode::SyncAll)?;

        info!(path = %path.display(), version = STORE_VERSION, "score store initialized");
        Ok(Self { db, scores })
    }

    /// Open the store if the path exists, otherwise initialize it.
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::init(path)
        }
    }
}

impl Storage for KvStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let Some(blob) = self.scores.get(SNAPSHOT_KEY)? else {
            trace!("no snapshot stored yet");
            return Ok(None);
        };

        if let Some(crc) = self.scores.get(SNAPSHOT_CRC_KEY)? {
            let stored = u32::from_le_bytes(
                crc.as_ref()
                    .try_into()
                    .map_err(|_| StoreError::InvalidFormat("Invalid checksum format".to_string()))?,
            );
            let computed = crc32fast::hash(blob.as_ref());
            if stored != computed {
                error!(stored, computed, "snapshot checksum mismatch");
                return Err(StoreError::Corrupted { stored, computed });
            }
        } else {
            warn!("snapshot has no checksum; loading unverified");
        }

        let snapshot: Snapshot = serde_json::from_slice(blob.as_ref())?;
        if snapshot.version != Snapshot::CURRENT_VERSION {
            return Err(StoreError::InvalidFormat(format!(
                "Snapshot version mismatch: expected {}, got {}",
                Snapshot::CURRENT_VERSION,
                snapshot.version
            )));
        }

        debug!(scores = snapshot.scores.len(), demo_mode = snapshot.demo_mode, "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let blob = serde_json::to_vec(snapshot)?;
        let crc = crc32fast::hash(&blob);

        self.scores.insert(SNAPSHOT_KEY, blob.as_slice())?;
        self.scores.insert(SNAPSHOT_CRC_KEY, crc.to_le_bytes())?;
        self.db.persist(PersistMode::SyncAll)?;

        debug!(scores = snapshot.scores.len(), bytes = blob.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use tempfile::TempDir;

    #[test]
    fn test_open_requires_init() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere");
        assert!(matches!(
            KvStore::open(&missing),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::init(dir.path().join("db")).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        let snapshot = Snapshot::new(samples::demo_records(), true);

        {
            let store = KvStore::init(&path).unwrap();
            store.save(&snapshot).unwrap();
        }

        let store = KvStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_checksum_mismatch_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::init(dir.path().join("db")).unwrap();
        store.save(&Snapshot::default()).unwrap();

        store
            .scores
            .insert(SNAPSHOT_CRC_KEY, 7u32.to_le_bytes())
            .unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::Corrupted { stored: 7, .. })
        ));
    }

    #[test]
    fn test_missing_checksum_still_loads() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::init(dir.path().join("db")).unwrap();
        store.save(&Snapshot::default()).unwrap();
        store.scores.remove(SNAPSHOT_CRC_KEY).unwrap();

        assert_eq!(store.load().unwrap(), Some(Snapshot::default()));
    }

    #[test]
    fn test_unknown_snapshot_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::init(dir.path().join("db")).unwrap();
        let blob = br#"{"version":99,"scores":[]}"#;
        store.scores.insert(SNAPSHOT_KEY, blob.as_slice()).unwrap();
        store
            .scores
            .insert(SNAPSHOT_CRC_KEY, crc32fast::hash(blob).to_le_bytes())
            .unwrap();

        assert!(matches!(store.load(), Err(StoreError::InvalidFormat(_))));
    }
}
