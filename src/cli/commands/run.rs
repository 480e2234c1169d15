//! Implementation of the `issue-herald run` command.

use anyhow::{anyhow, Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapters::http::HealthServer;
use crate::domain::models::{Config, HealthConfig};
use crate::domain::ports::Notifier;
use crate::services::{PollerDaemon, PollerDaemonConfig};

use super::{open_database, Components};

/// Poll until Ctrl-C or SIGTERM.
///
/// Only startup failures (database, liveness port) are returned as errors;
/// everything after that is logged and retried on the next cycle.
pub async fn execute(config: &Config) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let components = Components::build(config, pool)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health_task = if config.health.enabled {
        Some(spawn_health_server(&config.health, shutdown_rx).await?)
    } else {
        None
    };

    if let Err(e) = components.notifier.start().await {
        tracing::warn!(
            error = %e,
            "Telegram notifier failed to start; sends will fail until it is reachable"
        );
    }

    let cycle = components.poll_cycle(config.schedule.heartbeat_interval_minutes).await?;
    let daemon = PollerDaemon::new(cycle, PollerDaemonConfig::from_schedule(&config.schedule));
    let handle = daemon.handle();

    tracing::info!(
        repository = %config.github.repository(),
        label = %config.github.label,
        poll_minutes = config.schedule.poll_interval_minutes,
        heartbeat_minutes = config.schedule.heartbeat_interval_minutes,
        "issue herald running"
    );
    let daemon_task = tokio::spawn(daemon.run());

    shutdown_signal().await;
    tracing::info!("shutdown requested, finishing current cycle");
    handle.stop();

    let status = daemon_task.await.context("Poller daemon task failed")?;
    let _ = shutdown_tx.send(true);
    if let Some(task) = health_task {
        let _ = task.await;
    }
    components.notifier.stop().await;

    tracing::info!(
        total_cycles = status.total_cycles,
        panicked_cycles = status.panicked_cycles,
        "issue herald stopped"
    );
    Ok(())
}

async fn spawn_health_server(
    config: &HealthConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let listener = HealthServer::new(config.clone())
        .bind()
        .await
        .map_err(|e| {
            anyhow!(
                "Failed to bind liveness endpoint on {}:{}: {e}",
                config.host,
                config.port
            )
        })?;

    Ok(tokio::spawn(async move {
        let stop = async move {
            let _ = shutdown.changed().await;
        };
        if let Err(e) = HealthServer::serve_with_shutdown(listener, stop).await {
            tracing::error!(error = %e, "liveness endpoint failed");
        }
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
