//! The score repository.
//!
//! [`ScoreRepository`] owns the record set, keeps it sorted by date, and
//! writes a full [`Snapshot`] to its [`Storage`] after every mutation. A
//! mutation is built on a copy of the records and only becomes visible once
//! the snapshot was saved, so a failed save leaves the repository unchanged.
//!
//! Demo mode swaps the read path to a fixed dataset. While it is on, record
//! writes are rejected with [`Error::DemoModeActive`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ingest::{self, ExternalRecord, MergeReport};
use crate::kv::{Snapshot, Storage};
use crate::logging::{debug, info, warn};
use crate::model::{NewScore, ScorePatch, ScoreRecord};
use crate::ordering::{SortKey, SortOrder, sort_records};
use crate::samples;
use crate::series::{self, ChartFilter, DateRange, Series};
use crate::stats::{self, CourseStatistics, Statistics};

/// Progress of the one-time startup ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IngestStatus {
    /// Not attempted yet.
    #[default]
    Pending,
    /// Finished; an empty batch also completes.
    Complete { inserted: usize, replaced: usize },
    /// Loading the batch failed; ingestion is not retried.
    Failed { message: String },
}

impl IngestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Score records with persistence, queries and derived statistics.
pub struct ScoreRepository<S: Storage> {
    storage: S,
    scores: Vec<ScoreRecord>,
    demo_mode: bool,
    demo: Vec<ScoreRecord>,
    ingest_status: IngestStatus,
}

impl<S: Storage> ScoreRepository<S> {
    /// Load the repository from `storage`. An empty storage gives an empty set.
    pub fn open(storage: S) -> Result<Self> {
        let snapshot = storage.load()?.unwrap_or_default();
        let mut scores = snapshot.scores;
        scores.sort_by_key(|r| r.date);

        info!(
            scores = scores.len(),
            demo_mode = snapshot.demo_mode,
            "score repository opened"
        );
        Ok(Self {
            storage,
            scores,
            demo_mode: snapshot.demo_mode,
            demo: samples::demo_records(),
            ingest_status: IngestStatus::Pending,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Records visible to readers: the demo dataset in demo mode, otherwise
    /// the stored records. Always sorted by date.
    pub fn records(&self) -> &[ScoreRecord] {
        if self.demo_mode {
            &self.demo
        } else {
            &self.scores
        }
    }

    /// The stored records, regardless of demo mode.
    pub fn stored_records(&self) -> &[ScoreRecord] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScoreRecord> {
        self.records().iter().find(|r| r.id == id)
    }

    // Writes

    /// Store `score` under a fresh id and return the stored record.
    pub fn add(&mut self, score: NewScore) -> Result<ScoreRecord> {
        self.ensure_writable()?;
        score.typing.validate()?;

        let id = self.fresh_id();
        let record = score.with_id(id);
        let mut scores = self.scores.clone();
        scores.push(record.clone());
        scores.sort_by_key(|r| r.date);
        self.commit(scores)?;

        debug!(id = %record.id, date = %record.date, course = %record.course, "score added");
        Ok(record)
    }

    /// Add each score in turn. Stops at the first failure.
    pub fn add_many(&mut self, scores: impl IntoIterator<Item = NewScore>) -> Result<Vec<ScoreRecord>> {
        scores.into_iter().map(|score| self.add(score)).collect()
    }

    /// Add the fixed sample results. Returns how many were added.
    pub fn seed_samples(&mut self) -> Result<usize> {
        let added = self.add_many(samples::sample_scores())?;
        info!(count = added.len(), "sample scores added");
        Ok(added.len())
    }

    /// Parse a pasted result JSON, date it `today` and add it.
    ///
    /// Malformed JSON is rejected before anything is touched.
    pub fn import_json(&mut self, text: &str, today: NaiveDate) -> Result<ScoreRecord> {
        self.ensure_writable()?;
        let score = NewScore::from_manual_json(text, today)?;
        self.add(score)
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// Returns `None` when no record has that id. A changed date moves the
    /// record to its sorted position.
    pub fn update(&mut self, id: &str, patch: ScorePatch) -> Result<Option<ScoreRecord>> {
        self.ensure_writable()?;
        if let Some(typing) = &patch.typing {
            typing.validate()?;
        }

        let Some(index) = self.scores.iter().position(|r| r.id == id) else {
            warn!(id = %id, "update of unknown score ignored");
            return Ok(None);
        };

        let mut scores = self.scores.clone();
        let Some(record) = scores.get_mut(index) else {
            return Ok(None);
        };
        let date_changed = patch.apply(record);
        let updated = record.clone();
        if date_changed {
            scores.sort_by_key(|r| r.date);
        }
        self.commit(scores)?;

        debug!(id = %id, date_changed, "score updated");
        Ok(Some(updated))
    }

    /// Remove the record with `id`. Returns `false` if there was none.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.ensure_writable()?;

        if !self.scores.iter().any(|r| r.id == id) {
            warn!(id = %id, "delete of unknown score ignored");
            return Ok(false);
        }

        let scores = self.scores.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(scores)?;

        debug!(id = %id, "score deleted");
        Ok(true)
    }

    /// Remove every record. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        self.ensure_writable()?;

        let removed = self.scores.len();
        self.commit(Vec::new())?;

        info!(removed, "all scores cleared");
        Ok(removed)
    }

    /// Merge externally produced results. See [`ingest::merge`].
    pub fn ingest(&mut self, batch: &[ExternalRecord], today: NaiveDate) -> Result<MergeReport> {
        self.ensure_writable()?;
        self.merge_batch(batch, today)
    }

    /// Run the startup ingestion if it has not run yet.
    ///
    /// Returns `None` when ingestion already completed or failed. Any outcome
    /// leaves a terminal [`IngestStatus`], so a second call never re-ingests.
    /// This is a data load, not a user write, so it also runs in demo mode.
    pub fn ingest_once(
        &mut self,
        batch: &[ExternalRecord],
        today: NaiveDate,
    ) -> Result<Option<MergeReport>> {
        if !self.ingest_status.is_pending() {
            debug!("startup ingestion already done");
            return Ok(None);
        }

        match self.merge_batch(batch, today) {
            Ok(report) => {
                self.ingest_status = IngestStatus::Complete {
                    inserted: report.inserted,
                    replaced: report.replaced,
                };
                info!(inserted = report.inserted, replaced = report.replaced, "startup ingestion complete");
                Ok(Some(report))
            }
            Err(e) => {
                self.fail_ingest(e.to_string());
                Err(e)
            }
        }
    }

    /// Record that the startup ingestion source could not be loaded.
    pub fn fail_ingest(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(message = %message, "startup ingestion failed");
        self.ingest_status = IngestStatus::Failed { message };
    }

    pub fn ingest_status(&self) -> &IngestStatus {
        &self.ingest_status
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Switch demo mode. Only the flag is persisted; stored records are kept.
    pub fn set_demo_mode(&mut self, enabled: bool) -> Result<()> {
        if self.demo_mode == enabled {
            return Ok(());
        }
        self.storage
            .save(&Snapshot::new(self.scores.clone(), enabled))?;
        self.demo_mode = enabled;
        info!(enabled, "demo mode changed");
        Ok(())
    }

    // Queries

    /// Records dated within `[start, end]`, both given as `YYYY-MM-DD`.
    pub fn by_date_range(&self, start: &str, end: &str) -> Result<Vec<ScoreRecord>> {
        let range = DateRange::parse(start, end)?;
        Ok(self.by_date_range_dates(range.start, range.end))
    }

    /// Records dated within `[start, end]`.
    pub fn by_date_range_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<ScoreRecord> {
        let range = DateRange::new(start, end);
        self.records()
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect()
    }

    /// Records whose course is exactly `course`.
    pub fn by_course(&self, course: &str) -> Vec<ScoreRecord> {
        self.records()
            .iter()
            .filter(|r| r.course == course)
            .cloned()
            .collect()
    }

    /// Distinct course labels in first-seen order.
    pub fn courses(&self) -> Vec<String> {
        let mut courses: Vec<String> = Vec::new();
        for record in self.records() {
            if !courses.contains(&record.course) {
                courses.push(record.course.clone());
            }
        }
        courses
    }

    /// Records passing `filter`, ordered for a table.
    pub fn listing(&self, filter: &ChartFilter, key: SortKey, order: SortOrder) -> Vec<ScoreRecord> {
        let mut records = series::select(self.records(), filter);
        sort_records(&mut records, key, order);
        records
    }

    pub fn statistics(&self) -> Statistics {
        stats::summarize(self.records())
    }

    pub fn course_statistics(&self) -> CourseStatistics {
        stats::summarize_by_course(self.records())
    }

    /// Statistics for one course, falling back to all records when the course
    /// is unknown. `None` gives the global statistics.
    pub fn statistics_for(&self, course: Option<&str>) -> Statistics {
        match course {
            Some(course) => stats::statistics_for_course(self.records(), course),
            None => self.statistics(),
        }
    }

    /// Chart series for the records passing `filter`.
    pub fn series(&self, filter: &ChartFilter) -> Vec<Series> {
        series::project(&series::select(self.records(), filter))
    }

    // Helpers

    fn ensure_writable(&self) -> Result<()> {
        if self.demo_mode {
            warn!("write rejected while demo mode is active");
            return Err(Error::DemoModeActive);
        }
        Ok(())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = ScoreRecord::generate_id();
            if !self.scores.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }

    fn merge_batch(&mut self, batch: &[ExternalRecord], today: NaiveDate) -> Result<MergeReport> {
        for external in batch {
            external.data.typing.validate()?;
        }
        let mut scores = self.scores.clone();
        let report = ingest::merge(&mut scores, batch, today);
        self.commit(scores)?;
        Ok(report)
    }

    fn commit(&mut self, scores: Vec<ScoreRecord>) -> Result<()> {
        let snapshot = Snapshot::new(scores, self.demo_mode);
        self.storage.save(&snapshot)?;
        self.scores = snapshot.scores;
        Ok(())
    }
}
