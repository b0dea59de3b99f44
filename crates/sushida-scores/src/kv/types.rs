//! Persisted state of a score repository.

use serde::{Deserialize, Serialize};

use crate::model::ScoreRecord;

/// Everything the repository writes to durable storage, as one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Snapshot format version for future compatibility.
    pub version: u32,
    pub scores: Vec<ScoreRecord>,
    #[serde(default)]
    pub demo_mode: bool,
}

impl Snapshot {
    /// Current snapshot format version.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(scores: Vec<ScoreRecord>, demo_mode: bool) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            scores,
            demo_mode,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new(), false)
    }
}
