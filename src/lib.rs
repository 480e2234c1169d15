//! Issue Herald - labelled issue announcer
//!
//! Polls a GitHub repository for open issues created today that carry a
//! given label, and announces each new one to a Telegram channel exactly
//! once. Announced issues are remembered in SQLite so restarts do not
//! repeat them; when a poll finds nothing, a rate-limited heartbeat notice
//! is sent instead.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the port traits
//! - **Adapter Layer** (`adapters`): GitHub, Telegram, SQLite and the liveness endpoint
//! - **Service Layer** (`services`): The poll cycle and the daemon driving it
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use issue_herald::services::{PollCycle, PollerDaemon, PollerDaemonConfig};
//!
//! let cycle = PollCycle::initialize(source, notifier, repository, 360).await?;
//! let daemon = PollerDaemon::new(cycle, PollerDaemonConfig::default());
//! let handle = daemon.handle();
//! tokio::spawn(daemon.run());
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{AnnouncedRecord, Config, Issue, IssueBatch, IssueId};
pub use domain::ports::{AnnouncedIssueRepository, IssueSource, Notifier};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CycleReport, HeartbeatOutcome, PollCycle, PollerDaemon};
