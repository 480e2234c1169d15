//! Port for the announcement channel.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Prepare the underlying client. Must be called once before [`send`](Notifier::send).
    async fn start(&self) -> DomainResult<()>;

    /// Deliver `text` to the configured channel in a single attempt.
    ///
    /// Returns `true` only when the channel confirmed acceptance.
    async fn send(&self, text: &str) -> bool;

    /// Release the underlying client.
    async fn stop(&self);
}
