//! Response types for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Accumulated daemon counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub errors: u64,
    pub warnings: u64,
    pub notifications: u64,
    /// Hosts currently held in the registry
    pub zabbix_hosts: usize,
    /// Time of the last successful registry refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
}

/// What the listener did with a notification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntakeResponse {
    /// `subscription_confirmation`, `ignored` or `reconciled`
    pub disposition: String,
    /// Reconciliation outcome, for `reconciled` only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl IntakeResponse {
    #[must_use]
    pub fn confirmation() -> Self {
        Self {
            disposition: "subscription_confirmation".to_string(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn ignored() -> Self {
        Self {
            disposition: "ignored".to_string(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn reconciled(outcome: impl Into<String>) -> Self {
        Self {
            disposition: "reconciled".to_string(),
            outcome: Some(outcome.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_camel_case_keys() {
        let status = StatusResponse {
            errors: 1,
            warnings: 2,
            notifications: 3,
            zabbix_hosts: 4,
            last_refresh: None,
        };

        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "errors": 1,
                "warnings": 2,
                "notifications": 3,
                "zabbixHosts": 4
            })
        );
    }
}
