//! API route handlers

pub mod error;
pub mod notifications;
pub mod status;
pub mod system;

use scalesync_api::notifications::{ScalingMessage, SnsEnvelope};
use scalesync_api::responses::{HealthResponse, IntakeResponse, StatusResponse};
use utoipa::OpenApi;

pub use error::{ApiError, AppError};

#[derive(OpenApi)]
#[openapi(
    info(title = "scalesync", description = "Auto Scaling to Zabbix inventory sync"),
    paths(notifications::receive, status::status, system::health),
    components(schemas(
        SnsEnvelope,
        ScalingMessage,
        IntakeResponse,
        StatusResponse,
        HealthResponse,
        ApiError
    )),
    tags(
        (name = "notifications", description = "Scaling notification intake"),
        (name = "status", description = "Daemon counters"),
        (name = "system", description = "Liveness")
    )
)]
pub struct ApiDoc;
