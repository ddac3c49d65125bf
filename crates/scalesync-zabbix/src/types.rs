//! Host records as seen by the reconciler

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operational state of a monitored host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostStatus {
    /// Monitored (`status = 0`)
    Active,
    /// Unmonitored (`status = 1`)
    Disabled,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Active => write!(f, "ACTIVE"),
            HostStatus::Disabled => write!(f, "DISABLED"),
        }
    }
}

/// One monitoring-platform host entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Zabbix `hostid`, stable across renames
    pub id: String,
    /// Technical host name; equals the instance id for fleet members
    pub name: String,
    pub status: HostStatus,
}

impl HostRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: HostStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
        }
    }
}

/// Restriction applied to `host.get`
///
/// Unset ids are omitted from the request; Zabbix treats an explicit `0`
/// as a real filter value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostFilter {
    pub group_id: Option<u64>,
    pub template_id: Option<u64>,
}

impl HostFilter {
    /// Restrict to one host group
    #[must_use]
    pub fn group(id: u64) -> Self {
        Self {
            group_id: Some(id),
            template_id: None,
        }
    }

    /// Restrict to hosts linked to one template
    #[must_use]
    pub fn template(id: u64) -> Self {
        Self {
            group_id: None,
            template_id: Some(id),
        }
    }

    /// Build from configuration values where `0` means "not set"
    #[must_use]
    pub fn from_ids(group_id: u64, template_id: u64) -> Self {
        Self {
            group_id: (group_id != 0).then_some(group_id),
            template_id: (template_id != 0).then_some(template_id),
        }
    }
}

impl fmt::Display for HostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.group_id, self.template_id) {
            (Some(g), Some(t)) => write!(f, "group {g}, template {t}"),
            (Some(g), None) => write!(f, "group {g}"),
            (None, Some(t)) => write!(f, "template {t}"),
            (None, None) => write!(f, "unrestricted"),
        }
    }
}
