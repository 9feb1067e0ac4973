use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::repositories::RefreshTokenStore;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(store): State<Arc<dyn RefreshTokenStore>>) -> impl IntoResponse {
    match store.check_health().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "store": "connected"
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Refresh token store is not reachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "store": "disconnected"
                })),
            )
        }
    }
}
