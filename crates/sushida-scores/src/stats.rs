//! Summary statistics over score records.
//!
//! Everything here is a pure function of its input records. Statistics are
//! recomputed on every read; nothing is cached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ScoreRecord;

/// Aggregate metrics for a set of games. All fields are zero for an empty set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_games: usize,
    pub average_score: f64,
    pub best_score: i64,
    pub worst_score: i64,
    /// `100 * correct / (correct + miss)` over all keystrokes of the set.
    pub average_accuracy: f64,
    #[serde(rename = "averageTPS")]
    pub average_tps: f64,
    pub total_correct_types: u64,
    pub total_miss_types: u64,
}

/// Statistics per course label, for the courses present in the input only.
pub type CourseStatistics = BTreeMap<String, Statistics>;

/// Summarize `records`.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> Statistics {
    let mut games: usize = 0;
    let mut result_sum: i128 = 0;
    let mut tps_sum = 0.0;
    let mut best = i64::MIN;
    let mut worst = i64::MAX;
    let mut correct: u64 = 0;
    let mut miss: u64 = 0;

    for record in records {
        games += 1;
        result_sum += i128::from(record.result);
        tps_sum += record.typing.average_tps;
        best = best.max(record.result);
        worst = worst.min(record.result);
        correct = correct.saturating_add(record.typing.correct);
        miss = miss.saturating_add(record.typing.miss);
    }

    if games == 0 {
        return Statistics::default();
    }

    let keystrokes = correct.saturating_add(miss);

    Statistics {
        total_games: games,
        average_score: result_sum as f64 / games as f64,
        best_score: best,
        worst_score: worst,
        average_accuracy: if keystrokes > 0 {
            correct as f64 / keystrokes as f64 * 100.0
        } else {
            0.0
        },
        average_tps: tps_sum / games as f64,
        total_correct_types: correct,
        total_miss_types: miss,
    }
}

/// Summarize each distinct course of `records` independently.
pub fn summarize_by_course(records: &[ScoreRecord]) -> CourseStatistics {
    let mut groups: BTreeMap<&str, Vec<&ScoreRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.course.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(course, group)| (course.to_string(), summarize(group)))
        .collect()
}

/// Statistics for `course`, or for all records when the course has none.
pub fn statistics_for_course(records: &[ScoreRecord], course: &str) -> Statistics {
    if records.iter().any(|r| r.course == course) {
        summarize(records.iter().filter(|r| r.course == course))
    } else {
        summarize(records)
    }
}
