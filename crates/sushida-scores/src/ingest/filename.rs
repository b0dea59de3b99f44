//! Dates and ids derived from result file names.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Prefix marking records that came from ingested files.
pub const INGEST_ID_PREFIX: &str = "cli-";

/// A way of spelling a date inside a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatePattern {
    /// `20250115` anywhere in the name.
    Compact,
    /// `2025-01-15` anywhere in the name.
    Dashed,
    /// `sushida_result_20250115_093000`.
    Prefixed,
}

/// Patterns in the order they are tried.
const PATTERNS: [DatePattern; 3] = [DatePattern::Compact, DatePattern::Dashed, DatePattern::Prefixed];

static COMPACT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"([0-9]{8})").ok());
static DASHED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2})").ok());
static PREFIXED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"sushida_result_([0-9]{8})_[0-9]{6}").ok());

impl DatePattern {
    fn regex(self) -> Option<&'static Regex> {
        match self {
            Self::Compact => COMPACT.as_ref(),
            Self::Dashed => DASHED.as_ref(),
            Self::Prefixed => PREFIXED.as_ref(),
        }
    }

    fn format(self) -> &'static str {
        match self {
            Self::Compact | Self::Prefixed => "%Y%m%d",
            Self::Dashed => "%Y-%m-%d",
        }
    }

    /// The date of the first match, if that match is a real calendar date.
    fn extract(self, name: &str) -> Option<NaiveDate> {
        let captures = self.regex()?.captures(name)?;
        let digits = captures.get(1)?.as_str();
        NaiveDate::parse_from_str(digits, self.format()).ok()
    }
}

/// Drop a trailing `.ext` from `filename`.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() && !ext.contains('/') => base,
        _ => filename,
    }
}

/// Date encoded in `filename`, or `today` if no pattern yields one.
pub fn date_from_filename(filename: &str, today: NaiveDate) -> NaiveDate {
    let name = strip_extension(filename);
    PATTERNS
        .iter()
        .find_map(|pattern| pattern.extract(name))
        .unwrap_or(today)
}

/// Deterministic id for a record ingested from `filename`.
pub fn record_id_from_filename(filename: &str) -> String {
    format!("{}{}", INGEST_ID_PREFIX, strip_extension(filename))
}
