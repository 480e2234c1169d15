//! Implementation of the `issue-herald init` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::sqlite::SqliteAnnouncedIssueRepository;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::AnnouncedIssueRepository;

use super::open_database;

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub database_path: String,
    pub recorded_issues: u64,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        format!(
            "Database initialized at {} ({} announced issue(s) on record)",
            self.database_path, self.recorded_issues
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let repository = SqliteAnnouncedIssueRepository::new(pool);
    repository.initialize().await.context("Failed to create posted_issues table")?;
    let recorded_issues = repository.count().await.context("Failed to count announced issues")?;

    output(
        &InitOutput {
            success: true,
            database_path: config.database.path.clone(),
            recorded_issues,
        },
        json_mode,
    );
    Ok(())
}
