//! Request handlers.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::data::CovidRecord;
use crate::stats::StatisticsSnapshot;

use super::{ApiError, AppState};

/// Readiness probe, polled by the dashboard before its first API call.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Basic statistics over the four numeric columns.
///
/// Recomputed from the backing file on every request; a load failure turns
/// into a 500 response for this request only.
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsSnapshot>, ApiError> {
    let stats = state.stats.clone();
    let snapshot = tokio::task::spawn_blocking(move || stats.basic_statistics())
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .inspect_err(|err| error!("statistics request failed: {err}"))?;

    Ok(Json(snapshot))
}

/// Current dataset contents, one JSON object per row, freshly reloaded.
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<CovidRecord>>, ApiError> {
    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .inspect_err(|err| error!("data request failed: {err}"))?;

    Ok(Json(records))
}
