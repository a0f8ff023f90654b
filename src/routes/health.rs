use axum::extract::State;
use axum::Json;
use http::StatusCode;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`: serving only while the store answers.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.items.check_store().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "SERVING" })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "NOT_SERVING",
                }),
            )
        }
    }
}
