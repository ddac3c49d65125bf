//! In-memory mirror of the monitoring system's host list

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use scalesync_zabbix::{HostRecord, HostStatus};

/// Host records keyed by name
///
/// Only the reconciler mutates the registry; everything else sees it through
/// status snapshots.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: HashMap<String, HostRecord>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl HostRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map with a fresh `host.get` result
    pub(crate) fn replace(&mut self, hosts: HashMap<String, HostRecord>) {
        self.hosts = hosts;
        self.refreshed_at = Some(Utc::now());
    }

    /// Look up a host by name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&HostRecord> {
        self.hosts.get(name)
    }

    pub(crate) fn mark_removed(&mut self, name: &str) -> Option<HostRecord> {
        self.hosts.remove(name)
    }

    pub(crate) fn mark_disabled(&mut self, name: &str) {
        if let Some(record) = self.hosts.get_mut(name) {
            record.status = HostStatus::Disabled;
        }
    }

    /// Number of known hosts
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the registry holds no hosts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Host names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hosts.keys().cloned().collect();
        names.sort();
        names
    }

    /// Time of the last successful refresh
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
