use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::ApiError;
use crate::startup::AppState;

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub token: String,
}

#[instrument(skip(state, input), fields(username = %input.username))]
pub async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> Result<Json<LoginOutput>, ApiError> {
    if !state.auth.verify(&input.username, &input.password) {
        return Err(ApiError::unauthorized("invalid username or password"));
    }
    let token = state.auth.issue_token(&input.username)?;
    info!("operator logged in");
    Ok(Json(LoginOutput { token }))
}

/// Rejects requests without a valid `Authorization: Bearer <token>`.
/// CORS preflight requests pass through.
pub async fn require_bearer_token_state(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }
    let path = req.uri().path().to_string();
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                warn!(%path, "invalid Authorization format (expect Bearer)");
                return ApiError::unauthorized("invalid authorization header").into_response();
            }
        },
        None => {
            warn!(%path, "missing Authorization header");
            return ApiError::unauthorized("missing bearer token").into_response();
        }
    };

    match state.auth.validate_token(&token) {
        Ok(_) => next.run(req).await,
        Err(e) => {
            warn!(%path, err = %e, "token validation failed");
            ApiError::unauthorized("invalid or expired token").into_response()
        }
    }
}
