//! In-memory storage, for tests and throwaway sessions.

use std::sync::{Arc, Mutex};

use super::Storage;
use super::error::StoreError;
use super::types::Snapshot;

/// Storage that keeps the last saved snapshot in memory.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the repository wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<Snapshot>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(snapshot))),
            saves: Arc::default(),
        }
    }

    /// The last saved snapshot, if any.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::InvalidFormat("memory storage lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::InvalidFormat("memory storage lock poisoned".to_string()))?;
        *slot = Some(snapshot.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
