//! Service layer
//!
//! Coordinates the domain ports:
//! - Heartbeat rate limiting
//! - The poll cycle (fetch, filter, announce)
//! - The poller daemon running cycles on an interval

pub mod heartbeat;
pub mod poll_cycle;
pub mod poller_daemon;

pub use heartbeat::HeartbeatTimer;
pub use poll_cycle::{CycleReport, HeartbeatOutcome, PollCycle};
pub use poller_daemon::{DaemonHandle, DaemonStatus, PollerDaemon, PollerDaemonConfig};
