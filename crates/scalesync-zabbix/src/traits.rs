//! Monitoring API trait

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ZabbixError;
use crate::types::{HostFilter, HostRecord};

/// Host operations the reconciler needs from the monitoring platform
///
/// Each call is one-shot: no retries, no cached session.
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Fetch all hosts matching `filter`, keyed by host name
    async fn get_hosts(
        &self,
        filter: &HostFilter,
    ) -> Result<HashMap<String, HostRecord>, ZabbixError>;

    /// Delete a host by id
    async fn delete_host(&self, host_id: &str) -> Result<(), ZabbixError>;

    /// Set a host to unmonitored by id
    async fn disable_host(&self, host_id: &str) -> Result<(), ZabbixError>;
}
