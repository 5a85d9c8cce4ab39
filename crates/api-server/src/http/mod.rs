use axum::routing::{get, post};
use axum::{Router, middleware};
use teger_shared::analysis::MessageAnalyzer;

mod analyze;
mod cors;
mod errors;
mod health;
mod observability;

pub use cors::cors_layer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: MessageAnalyzer,
    pub health_engine_label: String,
    pub cors_allowed_origins: Vec<String>,
}

pub fn build_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.cors_allowed_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/analyze", post(analyze::analyze))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(cors)
        .with_state(app_state)
}
