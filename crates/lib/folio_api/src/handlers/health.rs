//! Liveness endpoint.

use axum::Json;
use axum::http::StatusCode;

use crate::models::{ApiResponse, HealthResponse};

/// `GET /health` — process is up and serving.
pub async fn health_handler() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: folio_core::version(),
        },
    ))
}
