//! SQLite adapter for AnnouncedIssueRepository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{all_embedded_migrations, parse_datetime, Migrator};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AnnouncedRecord, IssueId};
use crate::domain::ports::AnnouncedIssueRepository;

#[derive(Clone)]
pub struct SqliteAnnouncedIssueRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncedIssueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostedIssueRow {
    issue_id: i64,
    issue_number: i64,
    posted_at: Option<String>,
}

fn to_column(value: u64, column: &str) -> DomainResult<i64> {
    i64::try_from(value).map_err(|_| {
        DomainError::Storage(format!("{column} {value} does not fit an INTEGER column"))
    })
}

fn from_column(value: i64, column: &str) -> DomainResult<u64> {
    u64::try_from(value)
        .map_err(|_| DomainError::Serialization(format!("negative {column}: {value}")))
}

fn row_to_record(row: PostedIssueRow) -> DomainResult<AnnouncedRecord> {
    let posted_at = row.posted_at.ok_or_else(|| {
        DomainError::Serialization(format!("posted_at missing for issue {}", row.issue_id))
    })?;

    Ok(AnnouncedRecord {
        issue_id: IssueId(from_column(row.issue_id, "issue_id")?),
        issue_number: from_column(row.issue_number, "issue_number")?,
        announced_at: parse_datetime(&posted_at)?,
    })
}

#[async_trait]
impl AnnouncedIssueRepository for SqliteAnnouncedIssueRepository {
    async fn initialize(&self) -> DomainResult<()> {
        Migrator::new(self.pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn load_all(&self) -> DomainResult<HashSet<IssueId>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT issue_id FROM posted_issues")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(id,)| from_column(id, "issue_id").map(IssueId))
            .collect()
    }

    async fn record(&self, issue_id: IssueId, issue_number: u64) -> DomainResult<()> {
        sqlx::query("INSERT INTO posted_issues (issue_id, issue_number) VALUES (?1, ?2)")
            .bind(to_column(issue_id.0, "issue_id")?)
            .bind(to_column(issue_number, "issue_number")?)
            .execute(&self.pool)
            .await?;

        tracing::info!(issue_id = %issue_id, issue_number, "recorded announced issue");
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> DomainResult<Vec<AnnouncedRecord>> {
        let rows = sqlx::query_as::<_, PostedIssueRow>(
            "SELECT issue_id, issue_number, CAST(posted_at AS TEXT) AS posted_at FROM posted_issues
             ORDER BY posted_at DESC, issue_id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posted_issues")
            .fetch_one(&self.pool)
            .await?;
        from_column(count, "count")
    }
}
