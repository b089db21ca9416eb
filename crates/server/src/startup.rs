use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::ServerConfig;

use crate::auth::AuthState;
use crate::errors::StartupError;
use crate::routes;
use crate::store::MarketStore;

/// Every admin endpoint lives under this prefix.
pub const API_PREFIX: &str = "/api/v1/admin";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MarketStore>,
    pub auth: Arc<AuthState>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub async fn build_state(cfg: &ServerConfig) -> Result<AppState, StartupError> {
    let store = MarketStore::new();
    if cfg.seed_demo_data {
        store
            .seed_demo()
            .await
            .map_err(|e| StartupError::InvalidConfig(format!("seed data: {e}")))?;
        info!("demo data seeded");
    }
    Ok(AppState { store: Arc::new(store), auth: Arc::new(AuthState::new(cfg)?) })
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Bind `cfg.bind_addr()` and serve until `shutdown` resolves.
pub async fn run<F>(cfg: ServerConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::Any(anyhow::anyhow!("bind {addr}: {e}")))?;
    info!(%addr, prefix = API_PREFIX, "marketplace api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("server stopped");
    Ok(())
}
