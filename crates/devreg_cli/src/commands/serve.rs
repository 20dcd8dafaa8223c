//! Serve command implementation.

use devreg_core::{MemoryStore, Seed};
use devreg_server::{Server, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Options for the serve command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// IP address to bind; empty binds every interface.
    pub address: String,
    /// TCP port.
    pub port: u32,
    /// Load development accounts.
    pub seed: bool,
    /// Provisioning file with accounts and devices.
    pub accounts: Option<PathBuf>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Time allowed for in-flight requests after a shutdown signal.
    pub shutdown_timeout: Duration,
}

/// Builds the store selected by the options.
pub fn build_store(options: &ServeOptions) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    match (options.seed, &options.accounts) {
        (true, Some(_)) => Err("--seed and --accounts cannot be used together".into()),
        (true, None) => {
            info!("using development seed data");
            Ok(MemoryStore::testing())
        }
        (false, Some(path)) => {
            let seed = Seed::load(path)?;
            let store = MemoryStore::from_seed(seed)?;
            info!(
                path = %path.display(),
                accounts = store.account_count(),
                devices = store.device_count(),
                "loaded accounts"
            );
            Ok(store)
        }
        (false, None) => {
            warn!("no accounts configured, every request will be rejected");
            Ok(MemoryStore::new())
        }
    }
}

/// Builds the server configuration from the options.
pub fn build_config(options: &ServeOptions) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let config = ServerConfig::default()
        .with_bind_address(&options.address, options.port)?
        .with_request_timeout(options.request_timeout)
        .with_shutdown_timeout(options.shutdown_timeout);
    Ok(config)
}

/// Runs the serve command until SIGINT or SIGTERM.
pub async fn run(options: ServeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&options)?;
    let store = build_store(&options)?;

    info!(addr = %config.bind_addr, "starting server");
    let server = Server::new(config, Arc::new(store));
    server.run(shutdown_signal()).await?;
    Ok(())
}

/// Resolves on the first of SIGINT (ctrl-c) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}
