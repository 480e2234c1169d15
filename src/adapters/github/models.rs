//! GitHub search API response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads.
//! They are used internally by the GitHub adapter and are not
//! part of the public domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{Issue, IssueId};

/// Response of `GET /search/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchResponse {
    /// Total matches on the server, possibly more than `items`.
    #[serde(default)]
    pub total_count: u64,
    /// Set when the search timed out before collecting every match.
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubIssue>,
}

/// An issue as returned inside search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Unique numeric identifier for the issue.
    pub id: u64,
    /// Sequential number within the repository (e.g., 42 → "#42").
    pub number: u64,
    pub title: String,
    /// URL to view the issue in the GitHub UI.
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub user: GitHubUser,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
}

/// The account that opened the issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// A label applied to a GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    /// The label name (e.g., "bug", "priority: high").
    pub name: String,
    /// Hex colour without the leading `#`.
    #[serde(default)]
    pub color: Option<String>,
}

impl From<GitHubIssue> for Issue {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            id: IssueId(issue.id),
            number: issue.number,
            title: issue.title,
            url: issue.html_url,
            created_at: issue.created_at,
            author: issue.user.login,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}
