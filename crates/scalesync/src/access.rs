//! Caller address gate for the listener

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use scalesync_core::RecordWarning;
use tracing::{info, warn};

use crate::state::AppState;

/// Which callers may use gated endpoints
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allow: Option<Regex>,
}

impl AccessPolicy {
    /// Compile `hosts_allow`; an absent or empty pattern allows everyone
    ///
    /// # Errors
    /// Returns error if the pattern is not a valid regex
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let allow = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(p)?),
            _ => None,
        };
        Ok(Self { allow })
    }

    pub fn is_restricted(&self) -> bool {
        self.allow.is_some()
    }

    /// Unanchored match against the textual IP address; IPv4-mapped IPv6
    /// callers are matched in their plain IPv4 form
    pub fn allows(&self, ip: IpAddr) -> bool {
        self.allow
            .as_ref()
            .is_none_or(|re| re.is_match(&ip.to_canonical().to_string()))
    }
}

/// Reject callers the policy does not allow
///
/// A rejection counts as a warning.
pub async fn require_allowed_host(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if !state.access.allows(peer.ip()) {
        warn!(peer = %peer, %method, path = %path, "denied request (401)");
        if let Err(e) = state.reconciler.ask(RecordWarning).await {
            warn!(error = %e, "failed to record warning");
        }
        return (StatusCode::UNAUTHORIZED, "Not authorized").into_response();
    }

    info!(peer = %peer, %method, path = %path, "request");
    next.run(request).await
}
