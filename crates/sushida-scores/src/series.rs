//! Per-course time series for charting results over time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ScoreRecord, parse_date};

/// One chart point: the result of a game on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: NaiveDate,
    pub y: i64,
}

/// The chronological results of one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Course label.
    pub id: String,
    pub data: Vec<SeriesPoint>,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both ends as `YYYY-MM-DD`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which records a chart shows. Both filters apply together when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartFilter {
    pub course: Option<String>,
    pub range: Option<DateRange>,
}

impl ChartFilter {
    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn matches(&self, record: &ScoreRecord) -> bool {
        self.course.as_ref().is_none_or(|c| *c == record.course)
            && self.range.is_none_or(|r| r.contains(record.date))
    }
}

/// Records of `records` that pass `filter`, in their original order.
pub fn select(records: &[ScoreRecord], filter: &ChartFilter) -> Vec<ScoreRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Group `records` by course into date-ordered series.
///
/// Series appear in the order their course is first seen in `records`.
pub fn project(records: &[ScoreRecord]) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();

    for record in records {
        let point = SeriesPoint {
            x: record.date,
            y: record.result,
        };
        match series.iter_mut().find(|s| s.id == record.course) {
            Some(existing) => existing.data.push(point),
            None => series.push(Series {
                id: record.course.clone(),
                data: vec![point],
            }),
        }
    }

    for s in &mut series {
        s.data.sort_by_key(|p| p.x);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewScore, ScoreDetail, TypingDetail};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn record(day: u32, course: &str, result: i64) -> ScoreRecord {
        NewScore {
            date: date(day),
            course: course.into(),
            result,
            detail: ScoreDetail::default(),
            typing: TypingDetail::default(),
        }
        .with_id(format!("{}-{}", course, day))
    }

    #[test]
    fn test_project_sorts_each_series() {
        let records = vec![
            record(20, "高級", 3),
            record(15, "お手軽", 1),
            record(10, "高級", 1),
            record(18, "お手軽", 3),
            record(12, "高級", 2),
            record(16, "お手軽", 2),
        ];

        let series = project(&records);
        assert_eq!(series.len(), 2);
        for s in &series {
            assert_eq!(s.data.len(), 3);
            assert!(s.data.windows(2).all(|w| w[0].x <= w[1].x));
            assert_eq!(s.data.iter().map(|p| p.y).collect::<Vec<_>>(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_project_keeps_first_encounter_order() {
        let records = vec![record(3, "高級", 0), record(1, "お勧め", 0), record(2, "お手軽", 0)];
        let ids: Vec<_> = project(&records).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["高級", "お勧め", "お手軽"]);
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn test_filters_intersect() {
        let records = vec![
            record(15, "お手軽", 1),
            record(16, "高級", 2),
            record(17, "お手軽", 3),
            record(20, "お手軽", 4),
        ];
        let filter = ChartFilter::default()
            .course("お手軽")
            .range(DateRange::new(date(16), date(18)));

        let selected = select(&records, &filter);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|r| r.result), Some(3));
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateRange::parse("2025-01-16", "2025-01-18").unwrap();
        assert!(range.contains(date(16)));
        assert!(range.contains(date(18)));
        assert!(!range.contains(date(15)));
        assert!(!range.contains(date(19)));
    }

    #[test]
    fn test_point_json_shape() {
        let json = serde_json::to_value(project(&[record(15, "お手軽", 600)])).unwrap();
        assert_eq!(json[0]["id"], "お手軽");
        assert_eq!(json[0]["data"][0]["x"], "2025-01-15");
        assert_eq!(json[0]["data"][0]["y"], 600);
    }
}
