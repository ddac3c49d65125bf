//! Counter endpoint

use std::sync::Arc;

use axum::{Json, extract::State};
use scalesync_api::responses::StatusResponse;
use scalesync_core::GetStatus;

use crate::api::error::AppError;
use crate::state::AppState;

/// Accumulated counters and registry size
#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    responses(
        (status = 200, description = "Daemon counters", body = StatusResponse),
        (status = 401, description = "Caller is not allowed")
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    let snapshot = state
        .reconciler
        .ask(GetStatus)
        .await
        .map_err(|e| AppError::internal(format!("reconciler unavailable: {e}")))?;

    Ok(Json(StatusResponse {
        errors: snapshot.counters.errors,
        warnings: snapshot.counters.warnings,
        notifications: snapshot.counters.notifications,
        zabbix_hosts: snapshot.hosts,
        last_refresh: snapshot.last_refresh,
    }))
}
