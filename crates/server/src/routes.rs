pub mod auth;
pub mod files;
pub mod resources;
pub mod stats;

use axum::{middleware, routing::{get, post}, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use models::catalog::{Category, Service};
use models::geo::{Country, District, Region};
use models::people::{Client, Master};

use crate::metrics;
use crate::startup::{AppState, API_PREFIX};

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public health and metrics, login, and the bearer-protected admin API.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let protected = Router::new()
        .merge(resources::resource_routes::<Country>())
        .merge(resources::resource_routes::<Region>())
        .merge(resources::resource_routes::<District>())
        .merge(resources::resource_routes::<Category>())
        .merge(resources::resource_routes::<Service>())
        .merge(resources::resource_routes::<Master>())
        .merge(resources::resource_routes::<Client>())
        .route("/files", post(files::upload))
        .route("/files/:id", get(files::download))
        .route("/statistics/:name", get(stats::statistics))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    let api = Router::new().route("/auth/login", post(auth::login)).merge(protected);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics))
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn(metrics::track_requests))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
