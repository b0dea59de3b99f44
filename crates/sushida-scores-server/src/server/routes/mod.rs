//! API routes and handlers.

mod demo;
mod ingest;
mod scores;
mod stats;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;

use sushida_scores::model::parse_date;
use sushida_scores::{ChartFilter, DateRange};

use super::{error::ApiError, state::AppState};

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Score records
        .route(
            "/scores",
            get(scores::list_scores)
                .post(scores::create_score)
                .delete(scores::clear_scores),
        )
        .route("/scores/import", post(scores::import_score))
        .route("/scores/samples", post(scores::seed_samples))
        .route(
            "/scores/{id}",
            get(scores::get_score)
                .patch(scores::update_score)
                .delete(scores::delete_score),
        )
        // Derived views
        .route("/courses", get(stats::list_courses))
        .route("/statistics", get(stats::statistics))
        .route("/statistics/courses", get(stats::course_statistics))
        .route("/series", get(stats::series))
        // Ingestion
        .route("/ingest", post(ingest::ingest))
        .route("/ingest/status", get(ingest::ingest_status))
        // Demo mode
        .route("/demo", get(demo::get_demo).put(demo::set_demo));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Course and date filters shared by listing and chart endpoints.
///
/// Either date bound may be left out to leave that side open.
#[derive(Debug, Deserialize, Default)]
pub struct FilterQuery {
    pub course: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl FilterQuery {
    fn to_filter(&self) -> Result<ChartFilter, ApiError> {
        let mut filter = ChartFilter::default();
        if let Some(course) = &self.course {
            filter = filter.course(course.as_str());
        }
        if self.from.is_some() || self.to.is_some() {
            let start = bound(self.from.as_deref(), NaiveDate::MIN)?;
            let end = bound(self.to.as_deref(), NaiveDate::MAX)?;
            filter = filter.range(DateRange::new(start, end));
        }
        Ok(filter)
    }
}

fn bound(value: Option<&str>, open: NaiveDate) -> Result<NaiveDate, ApiError> {
    match value {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(open),
    }
}
