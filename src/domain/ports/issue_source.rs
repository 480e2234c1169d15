//! Port for the remote issue tracker.

use async_trait::async_trait;

use crate::domain::models::{Issue, IssueBatch};

#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Open issues carrying the configured label, created since the start
    /// of the current UTC day.
    ///
    /// Never fails: remote errors are logged by the implementation and
    /// reported as an empty batch.
    async fn fetch_todays_labeled_issues(&self) -> IssueBatch;

    /// Render the channel message announcing `issue`.
    fn format_announcement(&self, issue: &Issue) -> String;

    /// Render the "nothing new" notice sent when a poll finds no issues.
    fn heartbeat_message(&self, heartbeat_minutes: u64) -> String;
}
