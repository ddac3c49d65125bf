//! scalesync-zabbix: Zabbix JSON-RPC session client
//!
//! Authenticates against the Zabbix API and issues the host calls the
//! reconciler needs. Every public operation obtains its own session token.
//!
//! # Example
//! ```no_run
//! use scalesync_zabbix::{HostFilter, MonitoringApi, ZabbixClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ZabbixClient::new("https://zabbix.example/api_jsonrpc.php", "api", "secret")?;
//! let hosts = client.get_hosts(&HostFilter::group(12)).await?;
//! println!("{} hosts", hosts.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod rpc;
pub mod traits;
pub mod types;

pub use client::{SessionToken, ZabbixClient};
pub use error::{Result, ZabbixError};
pub use traits::MonitoringApi;
pub use types::{HostFilter, HostRecord, HostStatus};
