//! CLI command implementations.

pub mod init;
pub mod list;
pub mod once;
pub mod run;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::github::{GitHubClient, GitHubIssueSource};
use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteAnnouncedIssueRepository};
use crate::adapters::telegram::TelegramNotifier;
use crate::domain::models::{Config, DatabaseConfig};
use crate::services::PollCycle;

/// Open the configured database, creating the file and table when missing.
pub async fn open_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool_config = PoolConfig::with_max_connections(config.max_connections);
    initialize_database(&config.url(), Some(pool_config))
        .await
        .with_context(|| format!("Failed to open database at {}", config.path))
}

/// Concrete adapters wired from configuration, constructed once per process.
pub struct Components {
    pub source: Arc<GitHubIssueSource>,
    pub notifier: Arc<TelegramNotifier>,
    pub repository: Arc<SqliteAnnouncedIssueRepository>,
}

impl Components {
    pub fn build(config: &Config, pool: SqlitePool) -> Result<Self> {
        let client =
            GitHubClient::from_config(&config.github).context("Failed to build GitHub client")?;
        let notifier = TelegramNotifier::from_config(&config.telegram)
            .context("Failed to build Telegram client")?;

        Ok(Self {
            source: Arc::new(GitHubIssueSource::from_config(client, &config.github)),
            notifier: Arc::new(notifier),
            repository: Arc::new(SqliteAnnouncedIssueRepository::new(pool)),
        })
    }

    /// A poll cycle over these adapters with the dedup set loaded.
    pub async fn poll_cycle(&self, heartbeat_interval_minutes: u64) -> Result<PollCycle> {
        PollCycle::initialize(
            self.source.clone(),
            self.notifier.clone(),
            self.repository.clone(),
            heartbeat_interval_minutes,
        )
        .await
        .context("Failed to load announced issues")
    }
}
