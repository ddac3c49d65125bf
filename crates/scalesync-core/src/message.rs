//! Message types for actor communication
//!
//! Message handlers are implemented in `actor::reconciler`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kameo_macros::Reply;

use crate::state::{ReconcileOutcome, StatusCounters};

// ============================================================================
// Registry
// ============================================================================

/// Reload the registry from the monitoring system
#[derive(Debug)]
pub struct RefreshRegistry;

/// Number of hosts currently in the registry
#[derive(Debug)]
pub struct HostCount;

// ============================================================================
// Reconciliation
// ============================================================================

/// Startup sweep: reconcile every registry host that is not a fleet member
#[derive(Debug)]
pub struct InitialSync;

/// Apply the scale-down policy to one host
#[derive(Debug)]
pub struct ReconcileHost {
    /// Host name (the instance id)
    pub name: String,
}

/// A termination notification arrived for this instance
#[derive(Debug)]
pub struct HandleTermination {
    pub instance_id: String,
}

/// Summary of an initial sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Reply)]
pub struct SweepReport {
    /// Number of instances the fleet reported
    pub fleet_members: usize,
    /// Registry hosts that are fleet members
    pub kept: Vec<String>,
    /// Outcome per reconciled host
    pub reconciled: BTreeMap<String, ReconcileOutcome>,
}

impl SweepReport {
    /// Number of reconciled hosts with the given outcome
    #[must_use]
    pub fn count(&self, outcome: ReconcileOutcome) -> usize {
        self.reconciled.values().filter(|o| **o == outcome).count()
    }
}

// ============================================================================
// Status
// ============================================================================

/// Count an error raised outside the reconciler
#[derive(Debug)]
pub struct RecordError;

/// Count a warning raised outside the reconciler
#[derive(Debug)]
pub struct RecordWarning;

/// Snapshot of counters and registry size
#[derive(Debug)]
pub struct GetStatus;

#[derive(Debug, Clone, Reply)]
pub struct StatusSnapshot {
    pub counters: StatusCounters,
    pub hosts: usize,
    pub last_refresh: Option<DateTime<Utc>>,
}
