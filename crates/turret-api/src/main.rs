//! Turret node service binary.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use turret_api::config::ServiceConfig;
use turret_api::{build_router, AppState};
use turret_core::SystemClock;
use turret_heal::HealEngine;
use turret_ledger::HorizonGateway;
use turret_store::{FilesystemKvStore, KeyValueStore, MemoryKvStore, TxFunctionStore};
use turret_trust::TrustRegistry;

/// Run one turret node.
#[derive(Debug, Parser)]
#[command(name = "turret-api", about = "Turret federation node")]
struct Args {
    /// Path to the service config file.
    #[arg(long, default_value = "turret.toml")]
    config: PathBuf,
    /// Override the configured bind address.
    #[arg(long)]
    listen: Option<String>,
}

fn storage(config: &ServiceConfig, namespace: &str) -> Arc<dyn KeyValueStore> {
    match &config.data_dir {
        Some(dir) => Arc::new(FilesystemKvStore::new(dir.join(namespace))),
        None => Arc::new(MemoryKvStore::new()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServiceConfig::load(&args.config).context("loading config")?;

    // Trust failure is fatal: a node that cannot read its quorum must not
    // serve heals at all.
    let trust = Arc::new(
        TrustRegistry::load_from_path(&config.trust_document).context("loading trust document")?,
    );

    let gateway = Arc::new(
        HorizonGateway::new(
            config.turret.horizon_url.clone(),
            config.turret.request_timeout_ms,
        )
        .context("building ledger gateway")?,
    );

    let store = Arc::new(TxFunctionStore::new(
        storage(&config, "tx-functions"),
        storage(&config, "allowed"),
        gateway.clone(),
        config.turret.clone(),
    ));
    let engine = Arc::new(HealEngine::new(
        trust,
        gateway,
        store.clone(),
        Arc::new(SystemClock),
        config.turret.clone(),
    ));

    let state = AppState {
        store,
        engine,
        config: config.turret.clone(),
    };

    let listen = args.listen.unwrap_or_else(|| config.listen.clone());
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("binding {listen}"))?;
    tracing::info!(%listen, network = ?config.turret.network, "turret listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("serving")?;
    Ok(())
}
