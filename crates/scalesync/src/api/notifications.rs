//! Notification intake endpoint

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use scalesync_api::notifications::SnsEnvelope;
use scalesync_api::responses::IntakeResponse;
use scalesync_core::{HandleTermination, RecordError};
use tracing::{error, info};

use crate::api::error::{ApiError, AppError};
use crate::intake::{self, Intake};
use crate::state::AppState;

/// Receive a scaling notification
///
/// Served on the configured notification path (`/` by default).
#[utoipa::path(
    post,
    path = "/",
    tag = "notifications",
    request_body = SnsEnvelope,
    responses(
        (status = 200, description = "Notification processed or ignored", body = IntakeResponse),
        (status = 400, description = "Malformed notification", body = ApiError),
        (status = 401, description = "Caller is not allowed")
    )
)]
pub async fn receive(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<IntakeResponse>, AppError> {
    let intake = match intake::classify(&body, state.group_name()) {
        Ok(intake) => intake,
        Err(e) => {
            error!(error = %e, "rejected notification");
            if let Err(e) = state.reconciler.ask(RecordError).await {
                error!(error = %e, "failed to record error");
            }
            return Err(AppError::invalid_notification(e.to_string()));
        }
    };

    match intake {
        Intake::SubscriptionConfirmation { subscribe_url } => {
            info!(subscribe_url = %subscribe_url, "subscription confirmation received, visit the URL to confirm");
            Ok(Json(IntakeResponse::confirmation()))
        }
        Intake::Ignored(reason) => {
            info!(%reason, "notification ignored");
            Ok(Json(IntakeResponse::ignored()))
        }
        Intake::Terminate { instance_id } => {
            let outcome = state
                .reconciler
                .ask(HandleTermination { instance_id })
                .await
                .map_err(|e| AppError::internal(format!("reconciler unavailable: {e}")))?;
            Ok(Json(IntakeResponse::reconciled(outcome.to_string())))
        }
    }
}
