//! Implementation of the `issue-herald list` command.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::adapters::sqlite::SqliteAnnouncedIssueRepository;
use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AnnouncedRecord, Config};
use crate::domain::ports::AnnouncedIssueRepository;

use super::open_database;

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub total: u64,
    pub records: Vec<AnnouncedRecord>,
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["issue id", "number", "announced at"]);
        for record in &self.records {
            table.add_row(vec![
                record.issue_id.to_string(),
                format!("#{}", record.issue_number),
                record.announced_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ]);
        }
        render_list("announcement", &table, self.records.len(), self.total)
    }
}

pub async fn execute(config: &Config, limit: u32, json_mode: bool) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let repository = SqliteAnnouncedIssueRepository::new(pool);

    let records = repository.list_recent(limit).await.context("Failed to list announced issues")?;
    let total = repository.count().await.context("Failed to count announced issues")?;

    output(&ListOutput { total, records }, json_mode);
    Ok(())
}
