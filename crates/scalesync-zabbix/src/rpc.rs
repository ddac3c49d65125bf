//! JSON-RPC 2.0 wire format of the Zabbix API

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZabbixError};
use crate::types::{HostRecord, HostStatus};

pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_USER_LOGIN: &str = "user.login";
pub const METHOD_HOST_GET: &str = "host.get";
pub const METHOD_HOST_DELETE: &str = "host.delete";
pub const METHOD_HOST_UPDATE: &str = "host.update";

/// `host.update` status code for a monitored host
pub const STATUS_MONITORED: u8 = 0;
/// `host.update` status code for an unmonitored host
pub const STATUS_UNMONITORED: u8 = 1;

/// Request envelope
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<&'a str>,
    pub id: u64,
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse<R> {
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

impl RpcError {
    fn describe(&self) -> String {
        match (self.message.is_empty(), self.data.is_empty()) {
            (false, false) => format!("{} {}", self.message, self.data),
            (true, false) => self.data.clone(),
            _ => self.message.clone(),
        }
    }
}

impl<R> RpcResponse<R> {
    /// Check `error.code` before trusting `result`
    ///
    /// # Errors
    /// `Rejected` for a non-zero error code, `Protocol` when neither a result
    /// nor an error is present.
    pub fn into_result(self, method: &'static str) -> Result<R> {
        if let Some(error) = self.error
            && error.code != 0
        {
            return Err(ZabbixError::Rejected {
                method,
                code: error.code,
                message: error.describe(),
            });
        }

        self.result.ok_or_else(|| ZabbixError::Protocol {
            method,
            reason: "response carries neither result nor error".to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LoginParams<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct HostGetParams {
    pub output: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templateids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HostUpdateParams<'a> {
    pub hostid: &'a str,
    pub status: u8,
}

/// Host object as returned by `host.get`
#[derive(Debug, Clone, Deserialize)]
pub struct WireHost {
    pub hostid: String,
    pub host: String,
    pub status: String,
}

impl TryFrom<WireHost> for HostRecord {
    type Error = ZabbixError;

    fn try_from(wire: WireHost) -> Result<Self> {
        let status = match wire.status.parse::<u8>() {
            Ok(STATUS_MONITORED) => HostStatus::Active,
            Ok(STATUS_UNMONITORED) => HostStatus::Disabled,
            _ => {
                return Err(ZabbixError::Protocol {
                    method: METHOD_HOST_GET,
                    reason: format!("host {} has unknown status {:?}", wire.host, wire.status),
                });
            }
        };

        Ok(HostRecord {
            id: wire.hostid,
            name: wire.host,
            status,
        })
    }
}
