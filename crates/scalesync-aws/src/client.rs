//! Auto Scaling query API client

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::{FleetError, Result};
use crate::sigv4::{Credentials, RequestSigner};
use crate::traits::FleetApi;
use crate::types::parse_members;

const SERVICE: &str = "autoscaling";
const API_VERSION: &str = "2011-01-01";
const ACCEPT_JSON: &str = "application/json";

/// Cap on how much of an unexpected body ends up in an error
const ERROR_BODY_LIMIT: usize = 512;

/// Client for `DescribeAutoScalingGroups`
#[derive(Debug, Clone)]
pub struct AutoScalingClient {
    client: Client,
    endpoint: Url,
    region: String,
    credentials: Credentials,
}

impl AutoScalingClient {
    /// Create a client for the regional endpoint
    ///
    /// # Errors
    /// Returns an error if the region does not form a valid host name.
    pub fn new(region: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let region = region.into();
        let endpoint = Url::parse(&format!("https://{SERVICE}.{region}.amazonaws.com/"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            region,
            credentials,
        })
    }

    /// Use a different endpoint (VPC endpoint, local emulator)
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Result<Self> {
        self.endpoint = Url::parse(endpoint.as_ref())?;
        Ok(self)
    }

    fn describe_url(&self, group_name: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("Action", "DescribeAutoScalingGroups")
            .append_pair("AutoScalingGroupNames.member.1", group_name)
            .append_pair("Version", API_VERSION);
        url
    }
}

#[async_trait]
impl FleetApi for AutoScalingClient {
    async fn describe_members(&self, group_name: &str) -> Result<Vec<String>> {
        let url = self.describe_url(group_name);
        let signer = RequestSigner {
            credentials: &self.credentials,
            region: &self.region,
            service: SERVICE,
        };
        let signature = signer.sign_get(&url, &[("accept", ACCEPT_JSON)], Utc::now())?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_JSON)
            .header("x-amz-date", &signature.amz_date)
            .header("authorization", &signature.authorization);
        if let Some(token) = &signature.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let members = match parse_members(group_name, &body) {
            Err(e @ FleetError::Api { .. }) => return Err(e),
            _ if !status.is_success() => {
                let text = String::from_utf8_lossy(&body);
                return Err(FleetError::Status {
                    status: status.as_u16(),
                    body: text.chars().take(ERROR_BODY_LIMIT).collect(),
                });
            }
            parsed => parsed?,
        };

        for member in &members {
            debug!(
                group = group_name,
                instance_id = %member.instance_id,
                lifecycle_state = %member.lifecycle_state,
                "fleet member"
            );
        }

        Ok(members.into_iter().map(|m| m.instance_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_url() {
        let client = AutoScalingClient::new("eu-west-1", Credentials::new("AKID", "secret")).unwrap();

        let url = client.describe_url("my-asg");

        assert_eq!(
            url.as_str(),
            "https://autoscaling.eu-west-1.amazonaws.com/?Action=DescribeAutoScalingGroups&AutoScalingGroupNames.member.1=my-asg&Version=2011-01-01"
        );
    }
}
