//! GitHub issue search adapter.
//!
//! Finds open issues carrying the watched label that were created since
//! the start of the current UTC day, using the issue search endpoint.

pub mod client;
pub mod models;
pub mod source;

pub use client::GitHubClient;
pub use source::{build_search_query, start_of_utc_day, GitHubIssueSource};
