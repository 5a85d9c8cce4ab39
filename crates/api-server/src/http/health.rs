use axum::Json;
use axum::extract::State;
use teger_shared::models::HealthResponse;

use super::AppState;

/// Liveness only; the model service is not probed.
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::online(state.health_engine_label))
}
