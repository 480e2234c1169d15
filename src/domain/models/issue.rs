//! Issue domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracker-assigned issue identifier.
///
/// Distinct from the display number: the identifier is unique across the
/// whole tracker, the number only within one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub u64);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An issue as reported by the tracker. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    /// Number shown to humans (`#42`).
    pub number: u64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    /// Login of the user who opened the issue.
    pub author: String,
    /// Label names in the order the tracker returned them.
    pub labels: Vec<String>,
}

/// Result of one tracker query, in the tracker's ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueBatch {
    issues: Vec<Issue>,
}

impl IssueBatch {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// An empty batch, used when the query degraded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// First issue in tracker order, if any.
    pub fn most_recent(&self) -> Option<&Issue> {
        self.issues.first()
    }
}
