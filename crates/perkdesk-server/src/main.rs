//! PerkDesk Server — application entry point.

mod config;

use std::sync::Arc;
use std::time::Duration;

use perkdesk_auth::{AuthService, TracingNotifier, spawn_auto_unlock_sweeper};
use perkdesk_db::{DbManager, SurrealAdminRepository};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("perkdesk=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting PerkDesk server...");

    let config = Config::load()?;
    let db = DbManager::connect(&config.db_config()).await?;
    perkdesk_db::run_migrations(db.client()).await?;

    let auth_config = config.auth_config();
    let sweep_period = auth_config.auto_unlock_sweep_interval_secs;
    let admin_repo = match auth_config.pepper.clone() {
        Some(pepper) => SurrealAdminRepository::with_pepper(db.client().clone(), pepper),
        None => SurrealAdminRepository::new(db.client().clone()),
    };
    let auth = Arc::new(AuthService::new(admin_repo, TracingNotifier, auth_config));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = sweep_period.map(|secs| {
        spawn_auto_unlock_sweeper(auth.clone(), Duration::from_secs(secs), shutdown_rx)
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Auto-unlock sweeper did not stop cleanly");
        }
    }

    drop(auth);
    db.disconnect();

    tracing::info!("PerkDesk server stopped.");
    Ok(())
}
