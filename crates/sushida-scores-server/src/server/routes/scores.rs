//! Score record handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use sushida_scores::model::today;
use sushida_scores::{NewScore, ScorePatch, ScoreRecord, SortKey, SortOrder};

use super::super::{error::ApiError, state::AppState};
use super::FilterQuery;

/// Query parameters for listing scores.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    #[serde(flatten)]
    pub filter: FilterQuery,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Count of records affected by a bulk operation.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// List scores, filtered and sorted for a table.
#[instrument(skip(state))]
pub async fn list_scores(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ScoreRecord>>, ApiError> {
    let filter = query.filter.to_filter()?;
    let key = parse_or_default::<SortKey>("sort", query.sort.as_deref())?;
    let order = parse_or_default::<SortOrder>("order", query.order.as_deref())?;

    let records = state.read().await.listing(&filter, key, order);
    debug!(count = records.len(), "listed scores");
    Ok(Json(records))
}

/// Get one score by id.
#[instrument(skip(state))]
pub async fn get_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScoreRecord>, ApiError> {
    let repo = state.read().await;
    let record = repo.get(&id).ok_or_else(|| ApiError::score_not_found(&id))?;
    Ok(Json(record.clone()))
}

/// Store a new score.
#[instrument(skip(state, body))]
pub async fn create_score(
    State(state): State<AppState>,
    body: Result<Json<NewScore>, JsonRejection>,
) -> Result<(StatusCode, Json<ScoreRecord>), ApiError> {
    let Json(score) = body?;
    let record = state.write().await.add(score)?;
    info!(id = %record.id, "score created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Store a score from pasted result JSON, dated today.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn import_score(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<ScoreRecord>), ApiError> {
    let record = state.write().await.import_json(&body, today())?;
    info!(id = %record.id, "score imported");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Add the built-in sample scores.
#[instrument(skip(state))]
pub async fn seed_samples(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CountResponse>), ApiError> {
    let count = state.write().await.seed_samples()?;
    Ok((StatusCode::CREATED, Json(CountResponse { count })))
}

/// Merge a partial update into a score.
#[instrument(skip(state, body))]
pub async fn update_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ScorePatch>, JsonRejection>,
) -> Result<Json<ScoreRecord>, ApiError> {
    let Json(patch) = body?;
    let updated = state
        .write()
        .await
        .update(&id, patch)?
        .ok_or_else(|| ApiError::score_not_found(&id))?;
    info!("score updated");
    Ok(Json(updated))
}

/// Delete a score.
#[instrument(skip(state))]
pub async fn delete_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.write().await.delete(&id)? {
        return Err(ApiError::score_not_found(&id));
    }
    info!("score deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every score.
#[instrument(skip(state))]
pub async fn clear_scores(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state.write().await.clear()?;
    info!(count, "scores cleared");
    Ok(Json(CountResponse { count }))
}

fn parse_or_default<T>(parameter: &str, value: Option<&str>) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match value {
        Some(v) => v.parse().map_err(|e: String| ApiError::invalid_query(parameter, e)),
        None => Ok(T::default()),
    }
}
