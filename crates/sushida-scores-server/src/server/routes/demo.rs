//! Demo mode switch.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::super::{error::ApiError, state::AppState};

/// Demo mode flag, as read and written by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DemoMode {
    pub enabled: bool,
}

#[instrument(skip(state))]
pub async fn get_demo(State(state): State<AppState>) -> Json<DemoMode> {
    Json(DemoMode {
        enabled: state.read().await.demo_mode(),
    })
}

/// Turn demo mode on or off. Stored scores are untouched either way.
#[instrument(skip(state, body))]
pub async fn set_demo(
    State(state): State<AppState>,
    body: Result<Json<DemoMode>, JsonRejection>,
) -> Result<Json<DemoMode>, ApiError> {
    let Json(mode) = body?;
    state.write().await.set_demo_mode(mode.enabled)?;
    info!(enabled = mode.enabled, "demo mode set");
    Ok(Json(mode))
}
