//! Health endpoint backed by the background poller.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health`: 200 when every collaborator is up, 503 otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let body = HealthResponse {
        database: state.health.database_up(),
        message_bus: state.health.message_bus_up(),
    };
    let status = if body.database && body.message_bus {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
