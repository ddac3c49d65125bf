//! Configuration loading and validation

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use scalesync_aws::Credentials;
use scalesync_core::ScaleDownAction;
use scalesync_zabbix::HostFilter;
use serde::Deserialize;

use crate::access::AccessPolicy;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "SCALESYNC_CONFIG";

/// Paths served by the daemon itself
const RESERVED_PATHS: [&str; 3] = ["/status", "/health", "/openapi.json"];

/// Top-level configuration for the scalesync daemon
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    pub autoscale: AutoscaleConfig,
    pub zabbix: ZabbixConfig,
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Daemon settings
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins if set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Seconds between heartbeat log lines
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

/// Notification listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// `[IP]:Port`; an empty IP binds all interfaces
    #[serde(default = "default_address")]
    pub address: String,
    /// Path that accepts notifications
    #[serde(default = "default_notification_path")]
    pub notification_path: String,
    /// Regex matched against the caller's IP address
    #[serde(default)]
    pub hosts_allow: Option<String>,
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            notification_path: default_notification_path(),
            hosts_allow: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

/// Auto Scaling group settings
#[derive(Clone, Deserialize)]
pub struct AutoscaleConfig {
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    /// Overrides the regional endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl fmt::Debug for AutoscaleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoscaleConfig")
            .field("group_name", &self.group_name)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| ".."))
            .field("session_token", &self.session_token.as_ref().map(|_| ".."))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Zabbix settings
#[derive(Clone, Deserialize)]
pub struct ZabbixConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub scale_down_action: ScaleDownAction,
    /// Zero means unset
    #[serde(default)]
    pub restrict_to_group_id: u64,
    /// Zero means unset
    #[serde(default)]
    pub restrict_to_template_id: u64,
}

impl fmt::Debug for ZabbixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZabbixConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"..")
            .field("scale_down_action", &self.scale_down_action)
            .field("restrict_to_group_id", &self.restrict_to_group_id)
            .field("restrict_to_template_id", &self.restrict_to_template_id)
            .finish()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heartbeat_secs() -> u64 {
    3600
}

fn default_address() -> String {
    ":8080".to_string()
}

fn default_notification_path() -> String {
    "/".to_string()
}

impl Config {
    /// Load and validate configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error if the document is not valid configuration
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the configuration file
    ///
    /// An explicit path wins, then `$SCALESYNC_CONFIG`, then the first
    /// existing file among the common locations.
    ///
    /// # Errors
    /// Returns error if no configuration file can be found
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let mut paths = vec![
            PathBuf::from("scalesync.toml"),
            PathBuf::from("/etc/scalesync/scalesync.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("scalesync/scalesync.toml"));
        }

        match paths.into_iter().find(|p| p.exists()) {
            Some(path) => Ok(path),
            None => bail!("no config file found; pass --config or set {CONFIG_ENV}"),
        }
    }

    /// Check everything that must hold before the daemon starts
    ///
    /// # Errors
    /// Returns the first violated rule
    pub fn validate(&self) -> Result<()> {
        if self.autoscale.group_name.is_empty() {
            bail!("missing autoscale.group_name");
        }
        if self.autoscale.region.is_empty() {
            bail!("missing autoscale.region");
        }
        if self.zabbix.url.is_empty() || self.zabbix.user.is_empty() || self.zabbix.password.is_empty()
        {
            bail!("missing zabbix url, user or password");
        }
        match (
            self.zabbix.restrict_to_group_id,
            self.zabbix.restrict_to_template_id,
        ) {
            (0, 0) => bail!("zabbix hosts must be restricted to a group or a template"),
            (g, t) if g != 0 && t != 0 => {
                bail!("set only one of zabbix.restrict_to_group_id and restrict_to_template_id")
            }
            _ => {}
        }

        self.listen_addr()?;
        if self.listener.tls_cert_path.is_some() != self.listener.tls_key_path.is_some() {
            bail!("listener.tls_cert_path and listener.tls_key_path must be set together");
        }
        self.access_policy()?;

        let path = &self.listener.notification_path;
        if !path.starts_with('/') {
            bail!("listener.notification_path must start with '/'");
        }
        if RESERVED_PATHS.contains(&path.as_str()) {
            bail!("listener.notification_path '{path}' is reserved");
        }
        // Captures and wildcards would make the router reject the path
        if path.contains(['*', '{', '}', ':']) {
            bail!("listener.notification_path '{path}' must be a literal path");
        }

        if self.daemon.heartbeat_secs == 0 {
            bail!("daemon.heartbeat_secs must be greater than zero");
        }

        Ok(())
    }

    /// Socket address of the listener
    ///
    /// # Errors
    /// Returns error if the address is not of the form `[IP]:Port`
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen_address(&self.listener.address)
    }

    /// Compiled access policy for the listener
    ///
    /// # Errors
    /// Returns error if `hosts_allow` is not a valid regex
    pub fn access_policy(&self) -> Result<AccessPolicy> {
        AccessPolicy::new(self.listener.hosts_allow.as_deref())
            .wrap_err("listener.hosts_allow is not a valid regex")
    }

    /// Certificate and key paths when TLS is configured
    pub fn tls_paths(&self) -> Option<(&Path, &Path)> {
        match (&self.listener.tls_cert_path, &self.listener.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }

    pub fn host_filter(&self) -> HostFilter {
        HostFilter::from_ids(
            self.zabbix.restrict_to_group_id,
            self.zabbix.restrict_to_template_id,
        )
    }

    /// Fleet credentials from the config file, else from the environment
    pub fn fleet_credentials(&self) -> Option<Credentials> {
        let autoscale = &self.autoscale;
        match (&autoscale.access_key, &autoscale.secret_key) {
            (Some(access), Some(secret)) if !access.is_empty() && !secret.is_empty() => {
                let credentials = Credentials::new(access, secret);
                Some(match &autoscale.session_token {
                    Some(token) if !token.is_empty() => credentials.with_session_token(token),
                    _ => credentials,
                })
            }
            _ => Credentials::from_env(),
        }
    }
}

/// Parse `[IP]:Port`; `:Port` binds all IPv4 interfaces
fn parse_listen_address(address: &str) -> Result<SocketAddr> {
    let full = if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    };
    full.parse()
        .wrap_err_with(|| format!("listener address '{address}' must be of the form [IP]:Port"))
}
