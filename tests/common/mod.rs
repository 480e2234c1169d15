//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use issue_herald::adapters::github::{GitHubClient, GitHubIssueSource};
use issue_herald::adapters::telegram::TelegramNotifier;
use tempfile::TempDir;

pub const BOT_TOKEN: &str = "123456:TEST-token_value";
pub const CHANNEL: &str = "@easy_issues";

/// Create a temporary test database
///
/// Returns the path to a SQLite database file in a temporary directory.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("issues.db");
    (dir, db_path)
}

/// Search result item in the shape GitHub returns it.
pub fn github_issue_json(
    id: u64,
    number: u64,
    title: &str,
    url: &str,
    created_at: &str,
    login: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "number": number,
        "title": title,
        "html_url": url,
        "created_at": created_at,
        "user": { "login": login },
        "labels": [{ "name": "easy", "color": "c2e0c6" }],
        "state": "open"
    })
}

pub fn search_body(items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items
    })
    .to_string()
}

pub fn github_source(base_url: &str, token: Option<&str>) -> GitHubIssueSource {
    let client =
        GitHubClient::with_base_url(base_url, token.map(str::to_string), Duration::from_secs(5))
            .expect("Failed to build GitHub client");
    GitHubIssueSource::new(client, "python", "cpython", "easy")
}

pub fn telegram(base_url: &str) -> TelegramNotifier {
    TelegramNotifier::with_base_url(base_url, BOT_TOKEN, CHANNEL, Duration::from_secs(5))
        .expect("Failed to build Telegram client")
}

pub fn send_path() -> String {
    format!("/bot{BOT_TOKEN}/sendMessage")
}

pub fn get_me_path() -> String {
    format!("/bot{BOT_TOKEN}/getMe")
}

pub fn get_me_body() -> String {
    serde_json::json!({
        "ok": true,
        "result": { "id": 123456, "is_bot": true, "first_name": "Herald", "username": "herald_bot" }
    })
    .to_string()
}
