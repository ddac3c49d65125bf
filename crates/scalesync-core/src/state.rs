//! Reconciler state types

use std::fmt;

use kameo_macros::Reply;

use crate::config::ScaleDownAction;

/// Process-wide event counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounters {
    pub errors: u64,
    pub warnings: u64,
    pub notifications: u64,
}

impl StatusCounters {
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn record_warning(&mut self) {
        self.warnings += 1;
    }

    pub fn record_notification(&mut self) {
        self.notifications += 1;
    }
}

/// Result of reconciling a single host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub enum ReconcileOutcome {
    /// Host is still a fleet member
    Kept,
    /// Host was deleted from monitoring
    Removed,
    /// Host is (now) unmonitored
    Disabled,
    /// Monitoring has no host with that name
    NotFound,
    /// A monitoring call failed
    Failed,
    /// Dry-run: the action that would have been taken
    DryRun(ScaleDownAction),
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Kept => write!(f, "kept"),
            ReconcileOutcome::Removed => write!(f, "removed"),
            ReconcileOutcome::Disabled => write!(f, "disabled"),
            ReconcileOutcome::NotFound => write!(f, "not_found"),
            ReconcileOutcome::Failed => write!(f, "failed"),
            ReconcileOutcome::DryRun(ScaleDownAction::Delete) => write!(f, "dry_run_delete"),
            ReconcileOutcome::DryRun(ScaleDownAction::Disable) => write!(f, "dry_run_disable"),
        }
    }
}
