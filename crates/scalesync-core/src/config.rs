//! Reconciliation policy types

use std::fmt;

use scalesync_zabbix::HostFilter;
use serde::{Deserialize, Serialize};

/// What to do with a host that left the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleDownAction {
    /// Remove the host from monitoring
    Delete,
    /// Keep the host but stop monitoring it
    Disable,
}

impl fmt::Display for ScaleDownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDownAction::Delete => write!(f, "DELETE"),
            ScaleDownAction::Disable => write!(f, "DISABLE"),
        }
    }
}

/// Settings the reconciler is spawned with
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Auto Scaling group whose members must stay monitored
    pub group_name: String,
    /// Scale-down policy
    pub action: ScaleDownAction,
    /// Restriction for `host.get`
    pub filter: HostFilter,
    /// Compute and log outcomes without mutating calls
    pub dry_run: bool,
}
