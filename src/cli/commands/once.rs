//! Implementation of the `issue-herald once` command.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::Notifier;
use crate::services::{CycleReport, PollerDaemon, PollerDaemonConfig};

use super::{open_database, Components};

#[derive(Debug, Serialize)]
pub struct OnceOutput {
    pub repository: String,
    pub label: String,
    pub report: CycleReport,
}

impl CommandOutput for OnceOutput {
    fn to_human(&self) -> String {
        format!(
            "Polled {} for \"{}\": {}",
            self.repository,
            self.label,
            self.report.summary()
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let components = Components::build(config, pool)?;

    if let Err(e) = components.notifier.start().await {
        tracing::warn!(error = %e, "Telegram notifier failed to start");
    }

    let cycle = components.poll_cycle(config.schedule.heartbeat_interval_minutes).await?;
    let mut daemon = PollerDaemon::new(cycle, PollerDaemonConfig::from_schedule(&config.schedule));
    let report = daemon.run_once().await;
    components.notifier.stop().await;

    let Some(report) = report else {
        bail!("Poll cycle panicked; see the log for details");
    };

    output(
        &OnceOutput {
            repository: config.github.repository(),
            label: config.github.label.clone(),
            report,
        },
        json_mode,
    );
    Ok(())
}
