//! Inbound webhook payloads
//!
//! The outer envelope carries the scaling message as a JSON-encoded string, so
//! `ScalingMessage` has to be decoded from `SnsEnvelope::message` in a second
//! step.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope type of a subscription handshake
pub const TYPE_SUBSCRIPTION_CONFIRMATION: &str = "SubscriptionConfirmation";

/// Envelope type of a regular notification
pub const TYPE_NOTIFICATION: &str = "Notification";

/// The only scaling event that triggers reconciliation
pub const EVENT_INSTANCE_TERMINATE: &str = "autoscaling:EC2_INSTANCE_TERMINATE";

/// Outer notification envelope
///
/// Missing fields decode as empty strings so that classification, not the
/// decoder, decides what an incomplete envelope means.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SnsEnvelope {
    /// `SubscriptionConfirmation` or `Notification`
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// JSON-encoded `ScalingMessage`
    #[serde(rename = "Message", default)]
    pub message: String,
    /// Confirmation link (subscription handshakes only)
    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: String,
    /// Delivery identifier, logged when present
    #[serde(rename = "MessageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Originating topic, logged when present
    #[serde(rename = "TopicArn", default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,
}

/// Scaling lifecycle message embedded in a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScalingMessage {
    /// Event name, e.g. `autoscaling:EC2_INSTANCE_TERMINATE`
    #[serde(rename = "Event", default)]
    pub event: String,
    /// Instance the event refers to
    #[serde(rename = "EC2InstanceId", default)]
    pub instance_id: String,
    /// Fleet the instance belonged to
    #[serde(rename = "AutoScalingGroupName", default)]
    pub group_name: String,
}

impl ScalingMessage {
    /// Whether this message reports a terminated instance
    #[must_use]
    pub fn is_termination(&self) -> bool {
        self.event == EVENT_INSTANCE_TERMINATE
    }
}
