//! Fakes shared by the daemon's unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kameo::actor::{ActorRef, Spawn};
use scalesync_core::{
    ReconcileSettings, ReconcilerActor, ReconcilerActorArgs, RefreshRegistry, ScaleDownAction,
};
use scalesync_zabbix::{HostFilter, HostRecord, HostStatus, MonitoringApi, ZabbixError};

/// Monitoring backend holding `host-a` (id 10) and `host-b` (id 11)
#[derive(Default)]
pub struct FakeMonitoring {
    pub hosts: Mutex<HashMap<String, HostRecord>>,
    pub updates: Mutex<Vec<(String, HostStatus)>>,
    pub deletes: Mutex<Vec<String>>,
}

impl FakeMonitoring {
    pub fn two_hosts() -> Arc<Self> {
        let fake = Self::default();
        for (id, name) in [("10", "host-a"), ("11", "host-b")] {
            fake.hosts
                .lock()
                .unwrap()
                .insert(name.to_string(), HostRecord::new(id, name, HostStatus::Active));
        }
        Arc::new(fake)
    }
}

#[async_trait]
impl MonitoringApi for FakeMonitoring {
    async fn get_hosts(
        &self,
        _filter: &HostFilter,
    ) -> Result<HashMap<String, HostRecord>, ZabbixError> {
        Ok(self.hosts.lock().unwrap().clone())
    }

    async fn delete_host(&self, host_id: &str) -> Result<(), ZabbixError> {
        self.deletes.lock().unwrap().push(host_id.to_string());
        self.hosts.lock().unwrap().retain(|_, h| h.id != host_id);
        Ok(())
    }

    async fn disable_host(&self, host_id: &str) -> Result<(), ZabbixError> {
        self.updates
            .lock()
            .unwrap()
            .push((host_id.to_string(), HostStatus::Disabled));
        Ok(())
    }
}

/// Reconciler for group `my-asg` with a loaded registry
pub async fn spawn_reconciler(
    action: ScaleDownAction,
) -> (ActorRef<ReconcilerActor>, Arc<FakeMonitoring>) {
    let monitoring = FakeMonitoring::two_hosts();
    let actor = ReconcilerActor::spawn(ReconcilerActorArgs {
        monitoring: monitoring.clone(),
        fleet: None,
        settings: ReconcileSettings {
            group_name: "my-asg".to_string(),
            action,
            filter: HostFilter::group(12),
            dry_run: false,
        },
    });
    actor.ask(RefreshRegistry).await.unwrap();
    (actor, monitoring)
}
