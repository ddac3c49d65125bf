//! scalesync daemon
//!
//! Keeps the Zabbix host inventory in step with an AWS Auto Scaling group:
//! reconciles once at startup, then follows termination notifications.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use kameo::actor::Spawn;
use scalesync_aws::{AutoScalingClient, FleetApi};
use scalesync_core::{
    InitialSync, ReconcileSettings, ReconcilerActor, ReconcilerActorArgs, RefreshRegistry,
    RegistryReader,
};
use scalesync_zabbix::ZabbixClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod access;
mod api;
mod config;
mod heartbeat;
mod intake;
mod router;
mod state;
#[cfg(test)]
mod test_support;

use crate::config::{Config, DaemonConfig, LogFormat};
use crate::state::AppState;

/// Time granted to in-flight requests on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "scalesync", version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log what would change without touching Zabbix
    #[arg(long)]
    dry_run: bool,

    /// Run the initial sync and exit
    #[arg(long)]
    skip_listener: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let path = Config::locate(cli.config.as_deref())?;
    let config = Arc::new(Config::load(&path)?);
    init_tracing(&config.daemon)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        "scalesync starting"
    );
    if cli.dry_run {
        info!("dry-run mode, no changes will be made to Zabbix");
    }
    if !config.access_policy()?.is_restricted() {
        info!("access to the listener is not restricted (no hosts_allow configured)");
    }

    let monitoring = Arc::new(
        ZabbixClient::new(&config.zabbix.url, &config.zabbix.user, &config.zabbix.password)
            .wrap_err("invalid zabbix.url")?,
    );
    let fleet = fleet_client(&config)?;
    let has_fleet = fleet.is_some();

    let reconciler = ReconcilerActor::spawn(ReconcilerActorArgs {
        monitoring,
        fleet,
        settings: ReconcileSettings {
            group_name: config.autoscale.group_name.clone(),
            action: config.zabbix.scale_down_action,
            filter: config.host_filter(),
            dry_run: cli.dry_run,
        },
    });

    info!(filter = %config.host_filter(), "retrieving hosts from Zabbix");
    if let Err(e) = reconciler.ask(RefreshRegistry).await {
        warn!(error = %e, "starting with an empty registry");
    }

    if has_fleet {
        reconciler
            .ask(InitialSync)
            .await
            .map_err(|e| eyre!("initial sync aborted: {e}"))?;
    } else {
        info!("skipping initial sync, no fleet credentials configured");
    }

    if cli.skip_listener {
        info!("listener disabled, exiting after initial sync");
        reconciler.stop_gracefully().await.ok();
        return Ok(());
    }

    let heartbeat = heartbeat::spawn(
        RegistryReader::new(&reconciler),
        Duration::from_secs(config.daemon.heartbeat_secs),
    );

    let addr = config.listen_addr()?;
    let state = Arc::new(AppState::new(reconciler.clone(), config.clone())?);
    let app = router::create_router(state);

    let served = match config.tls_paths() {
        Some((cert, key)) => serve_tls(app, addr, cert, key).await,
        None => serve(app, addr).await,
    };

    heartbeat.abort();
    reconciler.stop_gracefully().await.ok();
    served
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(daemon: &DaemonConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&daemon.log_level)
            .wrap_err_with(|| format!("invalid daemon.log_level '{}'", daemon.log_level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match daemon.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| eyre!("cannot install tracing subscriber: {e}"))
}

fn fleet_client(config: &Config) -> Result<Option<Arc<dyn FleetApi>>> {
    let Some(credentials) = config.fleet_credentials() else {
        return Ok(None);
    };

    let mut client = AutoScalingClient::new(&config.autoscale.region, credentials)
        .wrap_err("invalid autoscale.region")?;
    if let Some(endpoint) = &config.autoscale.endpoint {
        client = client
            .with_endpoint(endpoint)
            .wrap_err("invalid autoscale.endpoint")?;
    }
    Ok(Some(Arc::new(client)))
}

async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("cannot start listener on {addr}"))?;
    info!(%addr, tls = false, "listening for notifications");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn serve_tls(app: Router, addr: SocketAddr, cert: &Path, key: &Path) -> Result<()> {
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .wrap_err_with(|| format!("cannot load TLS material {}", cert.display()))?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    info!(%addr, tls = true, "listening for notifications");
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .wrap_err_with(|| format!("cannot start listener on {addr}"))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "scalesync",
            "--config",
            "/etc/scalesync/scalesync.toml",
            "--dry-run",
            "--skip-listener",
        ]);

        assert_eq!(
            cli.config.as_deref(),
            Some(Path::new("/etc/scalesync/scalesync.toml"))
        );
        assert!(cli.dry_run);
        assert!(cli.skip_listener);
    }
}
