//! End-to-end poll cycles over mock GitHub and Telegram servers and a real
//! SQLite store.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use issue_herald::adapters::sqlite::{
    create_migrated_test_pool, initialize_database, SqliteAnnouncedIssueRepository,
};
use issue_herald::domain::models::IssueId;
use issue_herald::domain::ports::{AnnouncedIssueRepository, Notifier};
use issue_herald::services::{HeartbeatOutcome, PollCycle};
use mockito::{Matcher, Server, ServerGuard};

use common::{
    get_me_body, get_me_path, github_issue_json, github_source, search_body, send_path, telegram,
    temp_db_path,
};

async fn mock_get_me(server: &mut ServerGuard) {
    server
        .mock("GET", get_me_path().as_str())
        .with_status(200)
        .with_body(get_me_body())
        .create_async()
        .await;
}

async fn poll_cycle(
    github: &ServerGuard,
    telegram_server: &ServerGuard,
    repository: Arc<SqliteAnnouncedIssueRepository>,
) -> PollCycle {
    let notifier = Arc::new(telegram(&telegram_server.url()));
    notifier.start().await.expect("notifier should start");
    let source = Arc::new(github_source(&github.url(), None));
    PollCycle::initialize(source, notifier, repository, 360)
        .await
        .expect("cycle should initialize")
}

#[tokio::test]
async fn test_new_issue_is_announced_and_recorded_once() {
    let mut github = Server::new_async().await;
    github
        .mock("GET", "/search/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(search_body(vec![github_issue_json(
            100,
            7,
            "Fix typo",
            "https://x/7",
            "2024-01-01T00:00:00Z",
            "alice",
        )]))
        .expect(2)
        .create_async()
        .await;

    let mut tg = Server::new_async().await;
    mock_get_me(&mut tg).await;
    let send = tg
        .mock("POST", send_path().as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(serde_json::json!({ "parse_mode": "HTML" })),
            Matcher::Regex("Issue #7: Fix typo".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":42}}"#)
        .expect(1)
        .create_async()
        .await;

    let pool = create_migrated_test_pool().await.unwrap();
    let repository = Arc::new(SqliteAnnouncedIssueRepository::new(pool));
    let mut cycle = poll_cycle(&github, &tg, repository.clone()).await;

    let first = cycle.run_cycle().await;
    assert_eq!(first.announced, 1);
    assert_eq!(first.storage_failures, 0);

    let records = repository.list_recent(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].issue_id, IssueId(100));
    assert_eq!(records[0].issue_number, 7);

    let second = cycle.run_cycle().await;
    assert_eq!(second.announced, 0);
    assert_eq!(second.already_seen, 1);
    assert_eq!(second.heartbeat, HeartbeatOutcome::NotNeeded);

    send.assert_async().await;
    assert_eq!(repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_restart_announces_only_unseen_issue() {
    let (_dir, db_path) = temp_db_path();
    let url = format!("sqlite:{}", db_path.display());

    {
        let pool = initialize_database(&url, None).await.unwrap();
        let repository = SqliteAnnouncedIssueRepository::new(pool.clone());
        repository.record(IssueId(5), 1).await.unwrap();
        repository.record(IssueId(9), 2).await.unwrap();
        pool.close().await;
    }

    let mut github = Server::new_async().await;
    github
        .mock("GET", "/search/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(search_body(vec![
            github_issue_json(12, 3, "Three", "https://x/3", "2024-01-01T02:00:00Z", "carol"),
            github_issue_json(9, 2, "Two", "https://x/2", "2024-01-01T01:00:00Z", "bob"),
            github_issue_json(5, 1, "One", "https://x/1", "2024-01-01T00:00:00Z", "alice"),
        ]))
        .create_async()
        .await;

    let mut tg = Server::new_async().await;
    mock_get_me(&mut tg).await;
    let send = tg
        .mock("POST", send_path().as_str())
        .match_body(Matcher::Regex("Issue #3: Three".to_string()))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let pool = initialize_database(&url, None).await.unwrap();
    let repository = Arc::new(SqliteAnnouncedIssueRepository::new(pool));
    let mut cycle = poll_cycle(&github, &tg, repository.clone()).await;

    let report = cycle.run_cycle().await;

    send.assert_async().await;
    assert_eq!(report.fetched, 3);
    assert_eq!(report.announced, 1);
    assert_eq!(report.already_seen, 2);

    let stored = repository.load_all().await.unwrap();
    let expected: HashSet<IssueId> = [IssueId(5), IssueId(9), IssueId(12)]
        .into_iter()
        .collect();
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn test_empty_poll_sends_heartbeat_then_waits() {
    let mut github = Server::new_async().await;
    github
        .mock("GET", "/search/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(search_body(vec![]))
        .create_async()
        .await;

    let mut tg = Server::new_async().await;
    mock_get_me(&mut tg).await;
    let heartbeat = tg
        .mock("POST", send_path().as_str())
        .match_body(Matcher::Regex("No new".to_string()))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let pool = create_migrated_test_pool().await.unwrap();
    let repository = Arc::new(SqliteAnnouncedIssueRepository::new(pool));
    let mut cycle = poll_cycle(&github, &tg, repository).await;

    let now = Utc::now();
    assert_eq!(cycle.run_cycle_at(now).await.heartbeat, HeartbeatOutcome::Sent);
    assert_eq!(
        cycle.run_cycle_at(now + chrono::Duration::minutes(30)).await.heartbeat,
        HeartbeatOutcome::NotDue
    );
    heartbeat.assert_async().await;
}

#[tokio::test]
async fn test_tracker_outage_announces_nothing() {
    let mut github = Server::new_async().await;
    github
        .mock("GET", "/search/issues")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let mut tg = Server::new_async().await;
    mock_get_me(&mut tg).await;
    let heartbeat = tg
        .mock("POST", send_path().as_str())
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let pool = create_migrated_test_pool().await.unwrap();
    let repository = Arc::new(SqliteAnnouncedIssueRepository::new(pool));
    let mut cycle = poll_cycle(&github, &tg, repository.clone()).await;

    let report = cycle.run_cycle().await;
    assert_eq!(report.fetched, 0);
    assert_eq!(report.announced, 0);
    assert_eq!(repository.count().await.unwrap(), 0);
    heartbeat.assert_async().await;
}
