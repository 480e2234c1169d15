//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - AnnouncedIssueRepository: durable dedup store
//! - IssueSource: issue tracker queries
//! - Notifier: channel message delivery

pub mod announced_repository;
pub mod issue_source;
pub mod notifier;

pub use announced_repository::AnnouncedIssueRepository;
pub use issue_source::IssueSource;
pub use notifier::Notifier;
