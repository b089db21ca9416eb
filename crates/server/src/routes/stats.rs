use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::errors::ApiError;
use crate::startup::AppState;

/// Dashboard statistics; only `summary` is published.
pub async fn statistics(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    match name.as_str() {
        "summary" => Ok(Json(state.store.summary().await)),
        other => Err(ApiError::not_found(format!("unknown statistics '{other}'"))),
    }
}
