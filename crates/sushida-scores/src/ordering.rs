//! Table ordering for score listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ScoreRecord;

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Course,
    Result,
}

/// Direction of a listing. Listings default to newest / highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "course" => Ok(Self::Course),
            "result" => Ok(Self::Result),
            other => Err(format!(
                "unknown sort key '{}' (expected date, course or result)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Course => "course",
            Self::Result => "result",
        })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Sort `records` in place by `key` in `order`. The sort is stable.
pub fn sort_records(records: &mut [ScoreRecord], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &ScoreRecord, b: &ScoreRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Course => a.course.cmp(&b.course),
        SortKey::Result => a.result.cmp(&b.result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_scores;

    fn sorted(key: SortKey, order: SortOrder) -> Vec<ScoreRecord> {
        let mut records: Vec<ScoreRecord> = sample_scores()
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.with_id(format!("s{}", i)))
            .collect();
        sort_records(&mut records, key, order);
        records
    }

    #[test]
    fn test_sort_by_result_desc() {
        let records = sorted(SortKey::Result, SortOrder::Desc);
        assert_eq!(records.first().map(|r| r.result), Some(6200));
        assert_eq!(records.last().map(|r| r.result), Some(-4500));
    }

    #[test]
    fn test_sort_by_date_asc() {
        let records = sorted(SortKey::Date, SortOrder::Asc);
        assert!(records.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_sort_by_course_groups_labels() {
        let records = sorted(SortKey::Course, SortOrder::Asc);
        assert!(records.windows(2).all(|w| w[0].course <= w[1].course));
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("Result".parse::<SortKey>(), Ok(SortKey::Result));
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert!("score".parse::<SortKey>().is_err());
    }
}
