//! Application state shared across HTTP handlers

use std::sync::Arc;

use eyre::Result;
use kameo::actor::ActorRef;
use scalesync_core::ReconcilerActor;

use crate::access::AccessPolicy;
use crate::config::Config;

/// Application state shared across all handlers
pub struct AppState {
    /// The only writer of the host registry
    pub reconciler: ActorRef<ReconcilerActor>,
    pub config: Arc<Config>,
    pub access: AccessPolicy,
}

impl AppState {
    /// Create new application state
    ///
    /// # Errors
    /// Returns error if the access policy does not compile
    pub fn new(reconciler: ActorRef<ReconcilerActor>, config: Arc<Config>) -> Result<Self> {
        let access = config.access_policy()?;
        Ok(Self {
            reconciler,
            config,
            access,
        })
    }

    /// Fleet name notifications must refer to
    pub fn group_name(&self) -> &str {
        &self.config.autoscale.group_name
    }
}
