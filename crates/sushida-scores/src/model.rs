//! Score record types.
//!
//! The serialized field names (`payed`, `avarageTPS`) follow the JSON written
//! by the result extraction tool, so stored snapshots and ingested files share
//! one shape.

use chrono::{Local, NaiveDate, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of the random suffix in generated record ids.
const ID_SUFFIX_LEN: usize = 9;

/// Money paid for and won back from one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub payed: u64,
    pub gain: u64,
}

/// Keystroke counters for one game.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TypingDetail {
    pub correct: u64,
    #[serde(rename = "avarageTPS")]
    pub average_tps: f64,
    pub miss: u64,
}

impl TypingDetail {
    /// Total keystrokes, correct and missed.
    pub fn total(&self) -> u64 {
        self.correct.saturating_add(self.miss)
    }

    /// Share of correct keystrokes as a percentage, 0 when nothing was typed.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct as f64 / total as f64 * 100.0
    }

    /// Check that the TPS can be stored and read back.
    ///
    /// JSON has no NaN or infinity, so such a value would make the saved
    /// snapshot unreadable.
    pub fn validate(&self) -> Result<()> {
        if !self.average_tps.is_finite() || self.average_tps < 0.0 {
            return Err(Error::InvalidScore(format!(
                "avarageTPS must be a finite non-negative number, got {}",
                self.average_tps
            )));
        }
        Ok(())
    }
}

/// One completed game attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub date: NaiveDate,
    pub course: String,
    /// Net outcome of the game. Stored as given; never recomputed from `detail`.
    pub result: i64,
    pub detail: ScoreDetail,
    pub typing: TypingDetail,
}

impl ScoreRecord {
    /// Generate a fresh local id: `<unix millis>-<9 lowercase alphanumerics>`.
    pub fn generate_id() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("{}-{}", Utc::now().timestamp_millis(), suffix)
    }
}

/// A score that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScore {
    pub date: NaiveDate,
    pub course: String,
    pub result: i64,
    pub detail: ScoreDetail,
    pub typing: TypingDetail,
}

impl NewScore {
    /// Attach an id, producing a storable record.
    pub fn with_id(self, id: impl Into<String>) -> ScoreRecord {
        ScoreRecord {
            id: id.into(),
            date: self.date,
            course: self.course,
            result: self.result,
            detail: self.detail,
            typing: self.typing,
        }
    }

    /// Parse a pasted result JSON and date it `today`.
    ///
    /// Only `course`, `result`, `detail` and `typing` are read; anything else
    /// in the object is ignored.
    pub fn from_manual_json(text: &str, today: NaiveDate) -> Result<Self> {
        let external: ExternalScore =
            serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
        external.typing.validate()?;
        Ok(external.dated(today))
    }
}

impl From<ScoreRecord> for NewScore {
    fn from(record: ScoreRecord) -> Self {
        Self {
            date: record.date,
            course: record.course,
            result: record.result,
            detail: record.detail,
            typing: record.typing,
        }
    }
}

/// A result as written by the extraction tool: no id, no date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalScore {
    pub course: String,
    pub result: i64,
    pub detail: ScoreDetail,
    pub typing: TypingDetail,
}

impl ExternalScore {
    /// Turn this into a [`NewScore`] played on `date`.
    pub fn dated(self, date: NaiveDate) -> NewScore {
        NewScore {
            date,
            course: self.course,
            result: self.result,
            detail: self.detail,
            typing: self.typing,
        }
    }
}

/// Partial update for a stored record.
///
/// `detail` and `typing` replace their whole sub-object when present. The id
/// cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePatch {
    pub date: Option<NaiveDate>,
    pub course: Option<String>,
    pub result: Option<i64>,
    pub detail: Option<ScoreDetail>,
    pub typing: Option<TypingDetail>,
}

impl ScorePatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.course.is_none()
            && self.result.is_none()
            && self.detail.is_none()
            && self.typing.is_none()
    }

    /// Merge into `record`. Returns `true` if the date changed.
    pub fn apply(self, record: &mut ScoreRecord) -> bool {
        let mut date_changed = false;
        if let Some(date) = self.date {
            date_changed = date != record.date;
            record.date = date;
        }
        if let Some(course) = self.course {
            record.course = course;
        }
        if let Some(result) = self.result {
            record.result = result;
        }
        if let Some(detail) = self.detail {
            record.detail = detail;
        }
        if let Some(typing) = self.typing {
            record.typing = typing;
        }
        date_changed
    }
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date. A trailing time part (`T..` or ` ..`) is ignored.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| Error::invalid_date(input))
}

/// Render a result with an explicit sign for gains: `+600`, `-1200`, `0`.
pub fn format_signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}
