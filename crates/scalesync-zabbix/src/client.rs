//! HTTP client for the Zabbix JSON-RPC endpoint

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ZabbixError};
use crate::rpc::{
    HostGetParams, HostUpdateParams, JSONRPC_VERSION, LoginParams, METHOD_HOST_DELETE,
    METHOD_HOST_GET, METHOD_HOST_UPDATE, METHOD_USER_LOGIN, RpcRequest, RpcResponse,
    STATUS_UNMONITORED, WireHost,
};
use crate::traits::MonitoringApi;
use crate::types::{HostFilter, HostRecord};

const CONTENT_TYPE_JSON_RPC: &str = "application/json-rpc";

/// Short-lived Zabbix session token
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// JSON-RPC client for the Zabbix API
pub struct ZabbixClient {
    client: Client,
    url: Url,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl fmt::Debug for ZabbixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZabbixClient")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl ZabbixClient {
    /// Create a new client for the given `api_jsonrpc.php` URL
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn new(
        url: impl AsRef<str>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_client(url, user, password, Client::new())
    }

    /// Create a new client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn with_client(
        url: impl AsRef<str>,
        user: impl Into<String>,
        password: impl Into<String>,
        client: Client,
    ) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url.as_ref())?,
            user: user.into(),
            password: password.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Log in and return a fresh session token
    ///
    /// # Errors
    /// `AuthFailed` if Zabbix refuses the credentials, `Unreachable` on
    /// transport failure.
    pub async fn authenticate(&self) -> Result<SessionToken> {
        let params = LoginParams {
            user: &self.user,
            password: &self.password,
        };

        match self.call::<_, String>(METHOD_USER_LOGIN, params, None).await {
            Ok(token) => Ok(SessionToken(token)),
            Err(ZabbixError::Rejected { message, .. }) => Err(ZabbixError::AuthFailed(message)),
            Err(e) => Err(e),
        }
    }

    /// Issue one JSON-RPC request and decode its result
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
        session: Option<&SessionToken>,
    ) -> Result<R> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            auth: session.map(SessionToken::as_str),
            id,
        };
        let body = serde_json::to_vec(&request)?;

        debug!(method, id, "json-rpc call");

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON_RPC)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ZabbixError::Protocol {
                method,
                reason: format!("HTTP status {status}"),
            });
        }

        let reply: RpcResponse<R> =
            serde_json::from_slice(&bytes).map_err(|e| ZabbixError::Protocol {
                method,
                reason: e.to_string(),
            })?;

        reply.into_result(method)
    }
}

#[async_trait]
impl MonitoringApi for ZabbixClient {
    async fn get_hosts(&self, filter: &HostFilter) -> Result<HashMap<String, HostRecord>> {
        let session = self.authenticate().await?;
        let params = HostGetParams {
            output: "extend",
            groupids: filter.group_id.map(|id| id.to_string()),
            templateids: filter.template_id.map(|id| id.to_string()),
        };

        let wire_hosts: Vec<WireHost> = self.call(METHOD_HOST_GET, params, Some(&session)).await?;

        let mut hosts = HashMap::with_capacity(wire_hosts.len());
        for wire in wire_hosts {
            let record = match HostRecord::try_from(wire) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "skipping host from host.get result");
                    continue;
                }
            };
            if let Some(previous) = hosts.insert(record.name.clone(), record) {
                warn!(host = %previous.name, host_id = %previous.id, "duplicate host name in host.get result");
            }
        }

        debug!(count = hosts.len(), %filter, "fetched hosts");
        Ok(hosts)
    }

    async fn delete_host(&self, host_id: &str) -> Result<()> {
        let session = self.authenticate().await?;
        let _: Value = self
            .call(METHOD_HOST_DELETE, [host_id], Some(&session))
            .await?;

        debug!(host_id, "host deleted");
        Ok(())
    }

    async fn disable_host(&self, host_id: &str) -> Result<()> {
        let session = self.authenticate().await?;
        let params = HostUpdateParams {
            hostid: host_id,
            status: STATUS_UNMONITORED,
        };
        let _: Value = self
            .call(METHOD_HOST_UPDATE, params, Some(&session))
            .await?;

        debug!(host_id, "host disabled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secrets() {
        let client = ZabbixClient::new("http://zabbix.local/api_jsonrpc.php", "api", "hunter2")
            .unwrap();
        let token = SessionToken("0424bd59b807674191e7d77572075f33".to_string());

        assert!(!format!("{client:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("0424bd"));
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(
            ZabbixClient::new("not a url", "api", "secret"),
            Err(ZabbixError::Url(_))
        ));
    }
}
