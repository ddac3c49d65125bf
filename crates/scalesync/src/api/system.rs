//! Liveness and API description endpoints

use axum::Json;
use scalesync_api::responses::HealthResponse;
use utoipa::OpenApi;

use crate::api::ApiDoc;

/// Liveness probe, not gated
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Daemon is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// OpenAPI document
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
