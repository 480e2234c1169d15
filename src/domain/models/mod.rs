pub mod announcement;
pub mod config;
pub mod issue;

pub use announcement::{escape_markup, format_announcement, heartbeat_message, AnnouncedRecord};
pub use config::{
    Config, DatabaseConfig, GitHubConfig, HealthConfig, ScheduleConfig, TelegramConfig,
};
pub use issue::{Issue, IssueBatch, IssueId};
