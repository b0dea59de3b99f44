//! Derived views: courses, statistics and chart series.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use sushida_scores::{CourseStatistics, Series, Statistics};

use super::super::{error::ApiError, state::AppState};
use super::FilterQuery;

#[derive(Debug, Deserialize, Default)]
pub struct StatisticsQuery {
    pub course: Option<String>,
}

/// Distinct course labels in first-seen order.
#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.read().await.courses())
}

/// Aggregate statistics, for one course when `course` is given.
///
/// A course with no results falls back to the statistics of all results.
#[instrument(skip(state))]
pub async fn statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Json<Statistics> {
    Json(state.read().await.statistics_for(query.course.as_deref()))
}

/// Statistics keyed by course.
#[instrument(skip(state))]
pub async fn course_statistics(State(state): State<AppState>) -> Json<CourseStatistics> {
    Json(state.read().await.course_statistics())
}

/// One date-ordered series per course for the filtered results.
#[instrument(skip(state))]
pub async fn series(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<Series>>, ApiError> {
    let filter = query.to_filter()?;
    let series = state.read().await.series(&filter);
    debug!(series = series.len(), "projected series");
    Ok(Json(series))
}
