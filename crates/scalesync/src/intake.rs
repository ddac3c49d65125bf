//! Classification of inbound notifications
//!
//! Decides what a webhook body means before anything touches the reconciler.
//! The first matching rule wins.

use std::fmt;

use scalesync_api::notifications::{
    ScalingMessage, SnsEnvelope, TYPE_NOTIFICATION, TYPE_SUBSCRIPTION_CONFIRMATION,
};
use thiserror::Error;
use tracing::debug;

/// What to do with a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Subscription handshake; an operator has to visit the URL
    SubscriptionConfirmation { subscribe_url: String },
    /// Well-formed but not for us
    Ignored(IgnoreReason),
    /// The instance left the fleet
    Terminate { instance_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    OtherEvent(String),
    OtherGroup(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::OtherEvent(event) => write!(f, "non-termination event '{event}'"),
            IgnoreReason::OtherGroup(group) => write!(f, "message for other group '{group}'"),
        }
    }
}

/// Malformed notifications; each one counts as an error
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("decoding notification envelope failed: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("invalid notification type '{0}'")]
    UnknownType(String),

    #[error("decoding scaling message failed: {0}")]
    Message(#[source] serde_json::Error),

    #[error("termination event without instance id")]
    MissingInstanceId,
}

/// Classify a webhook body for the configured group
///
/// # Errors
/// Returns an `IntakeError` for bodies that are not valid notifications
pub fn classify(body: &[u8], group_name: &str) -> Result<Intake, IntakeError> {
    let envelope: SnsEnvelope = serde_json::from_slice(body).map_err(IntakeError::Envelope)?;
    debug!(
        kind = %envelope.kind,
        message_id = envelope.message_id.as_deref().unwrap_or("-"),
        topic_arn = envelope.topic_arn.as_deref().unwrap_or("-"),
        "notification envelope"
    );

    if envelope.kind == TYPE_SUBSCRIPTION_CONFIRMATION {
        return Ok(Intake::SubscriptionConfirmation {
            subscribe_url: envelope.subscribe_url,
        });
    }
    if envelope.kind != TYPE_NOTIFICATION {
        return Err(IntakeError::UnknownType(envelope.kind));
    }

    // The message is a JSON document encoded as a string
    let message: ScalingMessage =
        serde_json::from_str(&envelope.message).map_err(IntakeError::Message)?;

    if !message.is_termination() {
        return Ok(Intake::Ignored(IgnoreReason::OtherEvent(message.event)));
    }
    if message.group_name != group_name {
        return Ok(Intake::Ignored(IgnoreReason::OtherGroup(message.group_name)));
    }
    if message.instance_id.is_empty() {
        return Err(IntakeError::MissingInstanceId);
    }

    Ok(Intake::Terminate {
        instance_id: message.instance_id,
    })
}
