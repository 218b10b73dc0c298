//! Remittance ledger server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Store   │───▶│ RemitService │───▶│ Gateway  │
//! │  (YAML)  │    │(snapshot)│    │ (rates+FSM)  │    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Ctrl-C stops the gateway and, with persistence enabled, writes a store
//! snapshot before exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use remit_ledger::config::AppConfig;
use remit_ledger::gateway::{self, state::AppState};
use remit_ledger::identity::{IdentityProvider, StaticIdentity};
use remit_ledger::lifecycle::TransactionLifecycle;
use remit_ledger::service::RemitService;
use remit_ledger::store::{MemoryStore, RemitStore, StoreSnapshotter};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[cfg(feature = "dev-sessions")]
fn build_identity(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    tracing::warn!(
        sessions = config.identity.sessions.len(),
        "Static dev sessions enabled; do not use in production"
    );
    Arc::new(StaticIdentity::from_sessions(&config.identity.sessions))
}

#[cfg(not(feature = "dev-sessions"))]
fn build_identity(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    if !config.identity.sessions.is_empty() {
        tracing::warn!("identity.sessions ignored: built without dev-sessions");
    }
    Arc::new(StaticIdentity::new())
}

fn load_store(snapshotter: Option<&StoreSnapshotter>) -> anyhow::Result<MemoryStore> {
    let Some(snapshotter) = snapshotter else {
        return Ok(MemoryStore::new());
    };
    match snapshotter.load_latest()? {
        Some(snapshot) => {
            tracing::info!(
                rates = snapshot.rates.len(),
                transactions = snapshot.transactions.len(),
                "Store restored from snapshot"
            );
            Ok(MemoryStore::from_snapshot(snapshot))
        }
        None => {
            tracing::info!("No snapshot found, starting empty");
            Ok(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guards = remit_ledger::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        git = env!("REMIT_GIT_HASH"),
        "Starting remit_ledger"
    );

    let snapshotter = app_config
        .persistence
        .enabled
        .then(|| StoreSnapshotter::new(PathBuf::from(&app_config.persistence.data_dir)));
    let store = Arc::new(load_store(snapshotter.as_ref()).context("Failed to load snapshot")?);

    let service = Arc::new(RemitService::new(
        store.clone() as Arc<dyn RemitStore>,
        build_identity(&app_config),
        TransactionLifecycle::new(app_config.lifecycle.policy()),
        app_config.fees,
        Duration::from_millis(app_config.identity.profile_timeout_ms),
    ));
    service
        .rate_table()
        .seed(&app_config.rates)
        .await
        .context("Invalid seed rate in config")?;

    let state = Arc::new(AppState::new(service));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        tracing::info!("Shutdown requested");
    };
    gateway::run_server(&app_config.gateway, state, shutdown).await?;

    if let Some(snapshotter) = snapshotter {
        snapshotter
            .save(&store.export())
            .context("Failed to write snapshot")?;
    }

    Ok(())
}
