use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub websocket_connections: usize,
}

/// Liveness check; also reports how many websocket clients are attached
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        websocket_connections: state.services.hub.connection_count(),
    })
}
