//! Announcement records and the text sent to the channel.
//!
//! Everything remote-sourced (titles, logins, label names, URLs) passes
//! through [`escape_markup`] before it is embedded, since the channel
//! renders messages as HTML.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::issue::{Issue, IssueId};

/// One successfully announced issue, as stored by the dedup store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncedRecord {
    pub issue_id: IssueId,
    pub issue_number: u64,
    pub announced_at: DateTime<Utc>,
}

/// Neutralize the characters the channel treats as HTML markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the announcement for a newly found issue.
///
/// `watched_label` is the label the poller filters on and only appears in
/// the headline; the issue's own labels are listed in full.
pub fn format_announcement(issue: &Issue, watched_label: &str) -> String {
    let labels = issue
        .labels
        .iter()
        .map(|l| escape_markup(l))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "🐍 New \"{label}\" issue found!\n\n\
         📌 Issue #{number}: {title}\n\
         🔗 Link: {url}\n\
         ⏰ Created: {created}\n\
         👤 Author: {author}\n\
         🏷️ Labels: {labels}",
        label = escape_markup(watched_label),
        number = issue.number,
        title = escape_markup(&issue.title),
        url = escape_markup(&issue.url),
        created = issue.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        author = escape_markup(&issue.author),
    )
}

/// Render the periodic "nothing new" notice.
pub fn heartbeat_message(watched_label: &str, repository: &str, heartbeat_minutes: u64) -> String {
    format!(
        "📢 No new \"{}\" issues found in {} today.\nNext update in {} minutes.",
        escape_markup(watched_label),
        escape_markup(repository),
        heartbeat_minutes
    )
}
