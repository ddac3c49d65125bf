//! `ReconcilerActor`: Registry owner and scale-down policy
//!
//! Every registry read-modify-write and every counter update runs inside a
//! message handler, so the mailbox serializes the startup sweep, webhook
//! notifications and the heartbeat against each other.

use std::collections::HashSet;
use std::sync::Arc;

use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{error, info, warn};

use scalesync_aws::FleetApi;
use scalesync_zabbix::{HostStatus, MonitoringApi};

use crate::config::{ReconcileSettings, ScaleDownAction};
use crate::error::CoreError;
use crate::message::{
    GetStatus, HandleTermination, HostCount, InitialSync, ReconcileHost, RecordError,
    RecordWarning, RefreshRegistry, StatusSnapshot, SweepReport,
};
use crate::registry::HostRegistry;
use crate::state::{ReconcileOutcome, StatusCounters};

/// Arguments for spawning a `ReconcilerActor`
pub struct ReconcilerActorArgs {
    /// Monitoring system client
    pub monitoring: Arc<dyn MonitoringApi>,
    /// Fleet client, `None` when no cloud credentials are available
    pub fleet: Option<Arc<dyn FleetApi>>,
    pub settings: ReconcileSettings,
}

/// Keeps the monitoring inventory in line with fleet membership
pub struct ReconcilerActor {
    registry: HostRegistry,
    counters: StatusCounters,
    monitoring: Arc<dyn MonitoringApi>,
    fleet: Option<Arc<dyn FleetApi>>,
    settings: ReconcileSettings,
}

impl ReconcilerActor {
    /// Replace the registry with a fresh `host.get` result
    ///
    /// On failure the previous registry stays in place.
    async fn refresh(&mut self) -> Result<usize, CoreError> {
        match self.monitoring.get_hosts(&self.settings.filter).await {
            Ok(hosts) => {
                self.registry.replace(hosts);
                let count = self.registry.len();
                info!(hosts = count, filter = %self.settings.filter, "registry refreshed");
                Ok(count)
            }
            Err(e) => {
                self.counters.record_error();
                error!(error = %e, "fetching hosts failed, keeping previous registry");
                Err(CoreError::Monitoring(e.to_string()))
            }
        }
    }

    async fn reconcile(&mut self, name: &str) -> ReconcileOutcome {
        if self.registry.lookup(name).is_none() {
            info!(host = name, "host not in registry, refreshing");
            if self.refresh().await.is_err() {
                return ReconcileOutcome::Failed;
            }
        }

        let Some(record) = self.registry.lookup(name).cloned() else {
            self.counters.record_warning();
            warn!(host = name, "host is unknown to monitoring, nothing to do");
            return ReconcileOutcome::NotFound;
        };

        let action = self.settings.action;
        if action == ScaleDownAction::Disable && record.status == HostStatus::Disabled {
            info!(host = name, host_id = %record.id, "host already disabled");
            return ReconcileOutcome::Disabled;
        }

        if self.settings.dry_run {
            info!(host = name, host_id = %record.id, %action, "dry run, leaving host untouched");
            return ReconcileOutcome::DryRun(action);
        }

        let result = match action {
            ScaleDownAction::Delete => self.monitoring.delete_host(&record.id).await,
            ScaleDownAction::Disable => self.monitoring.disable_host(&record.id).await,
        };

        match result {
            Ok(()) => {
                let outcome = match action {
                    ScaleDownAction::Delete => {
                        self.registry.mark_removed(name);
                        ReconcileOutcome::Removed
                    }
                    ScaleDownAction::Disable => {
                        self.registry.mark_disabled(name);
                        ReconcileOutcome::Disabled
                    }
                };
                info!(host = name, host_id = %record.id, %outcome, "host reconciled");
                outcome
            }
            Err(e) => {
                self.counters.record_error();
                error!(host = name, host_id = %record.id, %action, error = %e, "reconciling host failed");
                ReconcileOutcome::Failed
            }
        }
    }

    async fn sweep(&mut self) -> Result<SweepReport, CoreError> {
        let fleet = self.fleet.clone().ok_or(CoreError::FleetNotConfigured)?;
        let group = self.settings.group_name.clone();

        info!(group = %group, "initial sync starting");

        let members = fleet.describe_members(&group).await.map_err(|e| {
            self.counters.record_error();
            error!(group = %group, error = %e, "fleet query failed");
            CoreError::Fatal(format!("fleet query for '{group}' failed: {e}"))
        })?;

        // An empty member list would unmonitor every host
        if members.is_empty() {
            self.counters.record_error();
            error!(group = %group, "fleet query returned no instances");
            return Err(CoreError::Fatal(format!(
                "fleet query for '{group}' returned no instances"
            )));
        }

        info!(group = %group, members = ?members, "current fleet members");

        let mut report = SweepReport {
            fleet_members: members.len(),
            ..SweepReport::default()
        };
        let members: HashSet<String> = members.into_iter().collect();

        for name in self.registry.names() {
            if members.contains(&name) {
                info!(host = %name, "host is a fleet member, keeping");
                report.kept.push(name);
            } else {
                info!(host = %name, "host is not a fleet member");
                let outcome = self.reconcile(&name).await;
                report.reconciled.insert(name, outcome);
            }
        }

        info!(
            group = %group,
            kept = report.kept.len(),
            reconciled = report.reconciled.len(),
            failed = report.count(ReconcileOutcome::Failed),
            "initial sync completed"
        );

        Ok(report)
    }
}

impl Actor for ReconcilerActor {
    type Args = ReconcilerActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(
            id = %actor_ref.id(),
            group = %args.settings.group_name,
            action = %args.settings.action,
            dry_run = args.settings.dry_run,
            "ReconcilerActor starting"
        );

        Ok(Self {
            registry: HostRegistry::new(),
            counters: StatusCounters::default(),
            monitoring: args.monitoring,
            fleet: args.fleet,
            settings: args.settings,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(
            reason = ?reason,
            errors = self.counters.errors,
            warnings = self.counters.warnings,
            notifications = self.counters.notifications,
            "ReconcilerActor stopping"
        );
        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<RefreshRegistry> for ReconcilerActor {
    type Reply = Result<usize, CoreError>;

    async fn handle(
        &mut self,
        _msg: RefreshRegistry,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.refresh().await
    }
}

impl Message<InitialSync> for ReconcilerActor {
    type Reply = Result<SweepReport, CoreError>;

    async fn handle(
        &mut self,
        _msg: InitialSync,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.sweep().await
    }
}

impl Message<ReconcileHost> for ReconcilerActor {
    type Reply = ReconcileOutcome;

    async fn handle(
        &mut self,
        msg: ReconcileHost,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.reconcile(&msg.name).await
    }
}

impl Message<HandleTermination> for ReconcilerActor {
    type Reply = ReconcileOutcome;

    async fn handle(
        &mut self,
        msg: HandleTermination,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.counters.record_notification();
        info!(instance_id = %msg.instance_id, "instance terminated");
        self.reconcile(&msg.instance_id).await
    }
}

impl Message<RecordError> for ReconcilerActor {
    type Reply = ();

    async fn handle(
        &mut self,
        _msg: RecordError,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.counters.record_error();
    }
}

impl Message<RecordWarning> for ReconcilerActor {
    type Reply = ();

    async fn handle(
        &mut self,
        _msg: RecordWarning,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.counters.record_warning();
    }
}

impl Message<GetStatus> for ReconcilerActor {
    type Reply = StatusSnapshot;

    async fn handle(
        &mut self,
        _msg: GetStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        StatusSnapshot {
            counters: self.counters,
            hosts: self.registry.len(),
            last_refresh: self.registry.refreshed_at(),
        }
    }
}

impl Message<HostCount> for ReconcilerActor {
    type Reply = usize;

    async fn handle(
        &mut self,
        _msg: HostCount,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.registry.len()
    }
}

/// Read-only view of the reconciler
///
/// Exposes only queries, for tasks that must never mutate the registry.
#[derive(Clone)]
pub struct RegistryReader {
    actor: ActorRef<ReconcilerActor>,
}

impl RegistryReader {
    #[must_use]
    pub fn new(actor: &ActorRef<ReconcilerActor>) -> Self {
        Self {
            actor: actor.clone(),
        }
    }

    /// Number of hosts currently in the registry
    ///
    /// # Errors
    /// Returns an error if the actor is no longer running.
    pub async fn host_count(&self) -> Result<usize, CoreError> {
        self.actor
            .ask(HostCount)
            .await
            .map_err(|e| CoreError::ActorError(e.to_string()))
    }

    /// Counters and registry size
    ///
    /// # Errors
    /// Returns an error if the actor is no longer running.
    pub async fn status(&self) -> Result<StatusSnapshot, CoreError> {
        self.actor
            .ask(GetStatus)
            .await
            .map_err(|e| CoreError::ActorError(e.to_string()))
    }
}
