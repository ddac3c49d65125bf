//! Fleet membership trait

use async_trait::async_trait;

use crate::error::FleetError;

/// Read-only view of a cloud fleet
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Instance ids currently in `group_name`, in provider order
    ///
    /// Never returns an empty list: no members is reported as an error.
    async fn describe_members(&self, group_name: &str) -> Result<Vec<String>, FleetError>;
}
