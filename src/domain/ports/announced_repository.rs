//! Repository port for the durable dedup store.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnnouncedRecord, IssueId};

#[async_trait]
pub trait AnnouncedIssueRepository: Send + Sync {
    /// Create the backing table if it does not exist yet. Idempotent.
    async fn initialize(&self) -> DomainResult<()>;

    /// Every identifier ever recorded.
    async fn load_all(&self) -> DomainResult<HashSet<IssueId>>;

    /// Durably record one announcement.
    ///
    /// Recording an identifier twice is a caller bug; implementations
    /// report it as a storage error.
    async fn record(&self, issue_id: IssueId, issue_number: u64) -> DomainResult<()>;

    /// Most recent announcements first.
    async fn list_recent(&self, limit: u32) -> DomainResult<Vec<AnnouncedRecord>>;

    /// Number of recorded announcements.
    async fn count(&self) -> DomainResult<u64>;
}
