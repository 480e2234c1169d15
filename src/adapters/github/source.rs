//! GitHub implementation of the [`IssueSource`] port.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::models::{
    format_announcement, heartbeat_message, GitHubConfig, Issue, IssueBatch,
};
use crate::domain::ports::IssueSource;
use crate::infrastructure::logging::scrub_secrets;

use super::client::GitHubClient;

/// Midnight (UTC) of the day containing `now`.
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Search qualifiers for open issues with `label` created at or after `since`.
pub fn build_search_query(owner: &str, repo: &str, label: &str, since: DateTime<Utc>) -> String {
    let label = if label.contains(char::is_whitespace) {
        format!("\"{label}\"")
    } else {
        label.to_string()
    };
    format!(
        "repo:{owner}/{repo} is:issue is:open label:{label} created:>={}",
        since.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Polls one repository for today's issues carrying one label.
#[derive(Debug, Clone)]
pub struct GitHubIssueSource {
    client: GitHubClient,
    owner: String,
    repo: String,
    label: String,
}

impl GitHubIssueSource {
    pub fn new(
        client: GitHubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            label: label.into(),
        }
    }

    pub fn from_config(client: GitHubClient, config: &GitHubConfig) -> Self {
        Self::new(client, &config.owner, &config.repo, &config.label)
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Query for issues created since the start of `now`'s UTC day.
    pub async fn fetch_since_day_of(&self, now: DateTime<Utc>) -> IssueBatch {
        let since = start_of_utc_day(now);
        let query = build_search_query(&self.owner, &self.repo, &self.label, since);
        tracing::info!(%query, "searching issues");

        match self.client.search_issues(&query).await {
            Ok(response) => {
                if response.incomplete_results {
                    tracing::warn!(
                        total_count = response.total_count,
                        "GitHub returned incomplete search results"
                    );
                }
                let issues: Vec<Issue> = response.items.into_iter().map(Issue::from).collect();
                tracing::info!(count = issues.len(), "found issues for today");
                IssueBatch::new(issues)
            }
            Err(e) => {
                tracing::error!(error = %scrub_secrets(&e.to_string()), "failed to fetch issues");
                IssueBatch::empty()
            }
        }
    }
}

#[async_trait]
impl IssueSource for GitHubIssueSource {
    async fn fetch_todays_labeled_issues(&self) -> IssueBatch {
        self.fetch_since_day_of(Utc::now()).await
    }

    fn format_announcement(&self, issue: &Issue) -> String {
        format_announcement(issue, &self.label)
    }

    fn heartbeat_message(&self, heartbeat_minutes: u64) -> String {
        heartbeat_message(&self.label, &self.repository(), heartbeat_minutes)
    }
}
