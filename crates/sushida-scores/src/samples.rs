//! Fixed sample results for seeding an empty store and for demo mode.

use chrono::NaiveDate;

use crate::model::{NewScore, ScoreDetail, ScoreRecord, TypingDetail};

/// Prefix of ids assigned to demo records.
pub const DEMO_ID_PREFIX: &str = "demo-";

/// (day of December 2024, course, result, payed, gain, correct, tps, miss)
type SampleRow = (u32, &'static str, i64, u64, u64, u64, f64, u64);

const SAMPLE_ROWS: [SampleRow; 30] = [
    (1, "お手軽", -1200, 3000, 1800, 42, 0.8, 15),
    (2, "お手軽", 600, 3000, 3600, 58, 1.2, 8),
    (3, "お勧め", -2400, 5000, 2600, 35, 0.6, 20),
    (4, "お勧め", 1000, 5000, 6000, 72, 1.5, 12),
    (5, "高級", -3600, 10000, 6400, 28, 0.4, 25),
    (6, "高級", 2000, 10000, 12000, 95, 1.8, 10),
    (7, "お手軽", 300, 3000, 3300, 52, 1.0, 12),
    (8, "お手軽", -800, 3000, 2200, 38, 0.7, 18),
    (9, "お勧め", 1500, 5000, 6500, 78, 1.6, 10),
    (10, "お勧め", -1800, 5000, 3200, 40, 0.8, 22),
    (11, "高級", 3200, 10000, 13200, 102, 2.0, 8),
    (12, "高級", -4500, 10000, 5500, 25, 0.5, 30),
    (13, "お手軽", 900, 3000, 3900, 60, 1.3, 6),
    (14, "お手軽", -500, 3000, 2500, 45, 0.9, 16),
    (15, "お勧め", 2100, 5000, 7100, 85, 1.7, 9),
    (16, "お勧め", -1200, 5000, 3800, 48, 1.0, 19),
    (17, "高級", 4800, 10000, 14800, 115, 2.3, 5),
    (18, "高級", -2800, 10000, 7200, 35, 0.7, 28),
    (19, "お手軽", 1200, 3000, 4200, 65, 1.4, 5),
    (20, "お手軽", -300, 3000, 2700, 48, 1.0, 14),
    (21, "お勧め", 2800, 5000, 7800, 90, 1.8, 7),
    (22, "お勧め", -900, 5000, 4100, 52, 1.1, 17),
    (23, "高級", 5500, 10000, 15500, 125, 2.5, 4),
    (24, "高級", -1500, 10000, 8500, 42, 0.8, 25),
    (25, "お手軽", 800, 3000, 3800, 58, 1.2, 9),
    (26, "お手軽", -600, 3000, 2400, 40, 0.8, 18),
    (27, "お勧め", 1800, 5000, 6800, 82, 1.6, 11),
    (28, "お勧め", -1600, 5000, 3400, 45, 0.9, 21),
    (29, "高級", 6200, 10000, 16200, 130, 2.6, 3),
    (30, "高級", -3200, 10000, 6800, 32, 0.6, 27),
];

/// The thirty sample results, one per day from 2024-12-01.
pub fn sample_scores() -> Vec<NewScore> {
    SAMPLE_ROWS
        .iter()
        .filter_map(|&(day, course, result, payed, gain, correct, tps, miss)| {
            Some(NewScore {
                date: NaiveDate::from_ymd_opt(2024, 12, day)?,
                course: course.to_string(),
                result,
                detail: ScoreDetail { payed, gain },
                typing: TypingDetail {
                    correct,
                    average_tps: tps,
                    miss,
                },
            })
        })
        .collect()
}

/// The sample results with stable `demo-<n>` ids, used as the demo dataset.
pub fn demo_records() -> Vec<ScoreRecord> {
    sample_scores()
        .into_iter()
        .enumerate()
        .map(|(i, score)| score.with_id(format!("{}{}", DEMO_ID_PREFIX, i + 1)))
        .collect()
}
