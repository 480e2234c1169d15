//! One fetch, filter, announce pass.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::IssueId;
use crate::domain::ports::{AnnouncedIssueRepository, IssueSource, Notifier};
use crate::services::heartbeat::HeartbeatTimer;

/// What happened to the heartbeat during a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatOutcome {
    /// The poll found issues, so no heartbeat was considered.
    #[default]
    NotNeeded,
    /// Nothing found, but the last heartbeat is too recent.
    NotDue,
    Sent,
    Failed,
}

/// Summary of a single cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub announced: usize,
    pub already_seen: usize,
    pub failed_sends: usize,
    pub storage_failures: usize,
    pub heartbeat: HeartbeatOutcome,
}

impl CycleReport {
    pub fn summary(&self) -> String {
        format!(
            "fetched {}, announced {}, already seen {}, failed sends {}, \
             storage failures {}, heartbeat {:?}",
            self.fetched,
            self.announced,
            self.already_seen,
            self.failed_sends,
            self.storage_failures,
            self.heartbeat
        )
    }
}

/// Drives poll cycles against one source, one channel and one store.
///
/// Holds the only live copy of the dedup set. The set grows by one entry
/// per announced issue and is never pruned; at a few issues per day that
/// stays small for the lifetime of the process.
pub struct PollCycle {
    source: Arc<dyn IssueSource>,
    notifier: Arc<dyn Notifier>,
    repository: Arc<dyn AnnouncedIssueRepository>,
    announced: HashSet<IssueId>,
    heartbeat: HeartbeatTimer,
}

impl PollCycle {
    /// Prepare the store and load every previously announced identifier.
    pub async fn initialize(
        source: Arc<dyn IssueSource>,
        notifier: Arc<dyn Notifier>,
        repository: Arc<dyn AnnouncedIssueRepository>,
        heartbeat_interval_minutes: u64,
    ) -> DomainResult<Self> {
        repository.initialize().await?;
        let announced = repository.load_all().await?;
        info!(known_issues = announced.len(), "loaded dedup set");

        Ok(Self {
            source,
            notifier,
            repository,
            announced,
            heartbeat: HeartbeatTimer::new(heartbeat_interval_minutes),
        })
    }

    /// Replace the heartbeat state (used to resume a known schedule).
    pub fn with_heartbeat(mut self, heartbeat: HeartbeatTimer) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn is_announced(&self, id: IssueId) -> bool {
        self.announced.contains(&id)
    }

    pub fn announced_count(&self) -> usize {
        self.announced.len()
    }

    pub fn heartbeat(&self) -> &HeartbeatTimer {
        &self.heartbeat
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with `now` as the heartbeat clock.
    #[instrument(skip(self))]
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let batch = self.source.fetch_todays_labeled_issues().await;
        let mut report = CycleReport {
            fetched: batch.len(),
            ..CycleReport::default()
        };

        if batch.is_empty() {
            report.heartbeat = self.maybe_send_heartbeat(now).await;
        } else {
            if let Some(latest) = batch.most_recent() {
                debug!(issue_number = latest.number, "most recent matching issue");
            }

            let mut attempted = HashSet::new();
            for issue in batch.issues() {
                if self.announced.contains(&issue.id) || !attempted.insert(issue.id) {
                    report.already_seen += 1;
                    continue;
                }

                let text = self.source.format_announcement(issue);
                if !self.notifier.send(&text).await {
                    warn!(
                        issue_id = %issue.id,
                        issue_number = issue.number,
                        "announcement failed, will retry next cycle"
                    );
                    report.failed_sends += 1;
                    continue;
                }

                if let Err(e) = self.repository.record(issue.id, issue.number).await {
                    error!(
                        issue_id = %issue.id,
                        error = %e,
                        "failed to record announced issue"
                    );
                    report.storage_failures += 1;
                }
                self.announced.insert(issue.id);
                report.announced += 1;
                info!(issue_id = %issue.id, issue_number = issue.number, "announced issue");
            }
        }

        info!(
            fetched = report.fetched,
            announced = report.announced,
            already_seen = report.already_seen,
            failed_sends = report.failed_sends,
            storage_failures = report.storage_failures,
            heartbeat = ?report.heartbeat,
            "poll cycle complete"
        );
        report
    }

    async fn maybe_send_heartbeat(&mut self, now: DateTime<Utc>) -> HeartbeatOutcome {
        if !self.heartbeat.is_due(now) {
            debug!(last_sent = ?self.heartbeat.last_sent(), "heartbeat not due");
            return HeartbeatOutcome::NotDue;
        }

        let text = self.source.heartbeat_message(self.heartbeat.interval_minutes());
        if self.notifier.send(&text).await {
            self.heartbeat.mark_sent(now);
            HeartbeatOutcome::Sent
        } else {
            warn!("heartbeat notification failed");
            HeartbeatOutcome::Failed
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::{Duration, TimeZone};

    use super::fakes::{issue, FakeNotifier, FakeRepository, FakeSource};
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    async fn cycle(
        source: &Arc<FakeSource>,
        notifier: &Arc<FakeNotifier>,
        repo: &Arc<FakeRepository>,
    ) -> PollCycle {
        PollCycle::initialize(source.clone(), notifier.clone(), repo.clone(), 360)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_restart_only_announces_new_issue() {
        let source = Arc::new(FakeSource::with(vec![issue(5, 1), issue(9, 2), issue(12, 3)]));
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::seeded(&[5, 9]));
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;

        assert_eq!(notifier.sent(), vec!["announce #3".to_string()]);
        assert_eq!(repo.record_count(), 3);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.announced, 1);
        assert_eq!(report.already_seen, 2);
        assert_eq!(report.heartbeat, HeartbeatOutcome::NotNeeded);
    }

    #[tokio::test]
    async fn test_duplicate_in_one_batch_is_sent_once() {
        let source = Arc::new(FakeSource::with(vec![issue(42, 7), issue(42, 7)]));
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(report.announced, 1);
        assert_eq!(report.already_seen, 1);
        assert_eq!(report.storage_failures, 0);
    }

    #[tokio::test]
    async fn test_duplicate_with_failing_send_is_attempted_once() {
        let source = Arc::new(FakeSource::with(vec![issue(42, 7), issue(42, 7)]));
        let notifier = Arc::new(FakeNotifier::default());
        notifier.succeed.store(false, Ordering::SeqCst);
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(report.failed_sends, 1);
    }

    #[tokio::test]
    async fn test_oversized_heartbeat_interval_initializes() {
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let mut poll =
            PollCycle::initialize(source, notifier.clone(), repo, 1_000_000_000_000_000)
                .await
                .unwrap();

        assert_eq!(poll.run_cycle_at(now()).await.heartbeat, HeartbeatOutcome::Sent);
        assert_eq!(
            poll.run_cycle_at(now() + Duration::days(3650)).await.heartbeat,
            HeartbeatOutcome::NotDue
        );
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_not_due_sends_nothing() {
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let last = now() - Duration::minutes(100);
        let mut poll = cycle(&source, &notifier, &repo)
            .await
            .with_heartbeat(HeartbeatTimer::new(360).with_last_sent(last));

        let report = poll.run_cycle_at(now()).await;

        assert!(notifier.sent().is_empty());
        assert_eq!(report.heartbeat, HeartbeatOutcome::NotDue);
        assert_eq!(poll.heartbeat().last_sent(), Some(last));
    }

    #[tokio::test]
    async fn test_heartbeat_due_sends_once_and_updates_timer() {
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await.with_heartbeat(
            HeartbeatTimer::new(360).with_last_sent(now() - Duration::minutes(400)),
        );

        let report = poll.run_cycle_at(now()).await;

        assert_eq!(notifier.sent(), vec!["heartbeat 360".to_string()]);
        assert_eq!(report.heartbeat, HeartbeatOutcome::Sent);
        assert_eq!(poll.heartbeat().last_sent(), Some(now()));

        let report = poll.run_cycle_at(now() + Duration::minutes(30)).await;
        assert_eq!(report.heartbeat, HeartbeatOutcome::NotDue);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_first_empty_poll_after_start_sends_heartbeat() {
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        assert_eq!(poll.run_cycle_at(now()).await.heartbeat, HeartbeatOutcome::Sent);
    }

    #[tokio::test]
    async fn test_failed_heartbeat_leaves_timer_unchanged() {
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(FakeNotifier::default());
        notifier.succeed.store(false, Ordering::SeqCst);
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;

        assert_eq!(report.heartbeat, HeartbeatOutcome::Failed);
        assert!(poll.heartbeat().last_sent().is_none());
    }

    #[tokio::test]
    async fn test_failed_send_is_retried_next_cycle() {
        let source = Arc::new(FakeSource::with(vec![issue(100, 7)]));
        let notifier = Arc::new(FakeNotifier::default());
        notifier.succeed.store(false, Ordering::SeqCst);
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;
        assert_eq!(report.failed_sends, 1);
        assert!(!poll.is_announced(IssueId(100)));
        assert_eq!(repo.record_count(), 0);

        notifier.succeed.store(true, Ordering::SeqCst);
        let report = poll.run_cycle_at(now()).await;
        assert_eq!(report.announced, 1);
        assert!(poll.is_announced(IssueId(100)));
        assert_eq!(repo.record_count(), 1);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_still_prevents_reannouncement() {
        let source = Arc::new(FakeSource::with(vec![issue(100, 7)]));
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        repo.fail_writes.store(true, Ordering::SeqCst);
        let mut poll = cycle(&source, &notifier, &repo).await;

        let report = poll.run_cycle_at(now()).await;
        assert_eq!(report.announced, 1);
        assert_eq!(report.storage_failures, 1);
        assert!(poll.is_announced(IssueId(100)));

        let report = poll.run_cycle_at(now()).await;
        assert_eq!(report.announced, 0);
        assert_eq!(report.already_seen, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_second_identical_cycle_sends_nothing() {
        let source = Arc::new(FakeSource::with(vec![issue(100, 7)]));
        let notifier = Arc::new(FakeNotifier::default());
        let repo = Arc::new(FakeRepository::default());
        let mut poll = cycle(&source, &notifier, &repo).await;

        poll.run_cycle_at(now()).await;
        let report = poll.run_cycle_at(now()).await;

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(report.announced, 0);
        assert_eq!(report.heartbeat, HeartbeatOutcome::NotNeeded);
        assert_eq!(poll.announced_count(), 1);
    }

    #[test]
    fn test_report_summary_mentions_counts() {
        let report = CycleReport {
            fetched: 3,
            announced: 1,
            ..CycleReport::default()
        };
        let summary = report.summary();
        assert!(summary.contains("fetched 3"));
        assert!(summary.contains("announced 1"));
    }
}
