use serde::{Deserialize, Deserializer, Serialize};

use crate::infrastructure::logging::LogConfig;

/// Main configuration structure for the issue herald
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Issue tracker to poll
    #[serde(default)]
    pub github: GitHubConfig,

    /// Channel announcements are sent to
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Poll and heartbeat cadence
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Dedup store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Liveness endpoint configuration
    #[serde(default)]
    pub health: HealthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

/// GitHub search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Personal access token; requests are anonymous when absent
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub token: Option<String>,

    /// Repository owner (user or organisation)
    #[serde(default = "default_owner", deserialize_with = "string_or_number")]
    pub owner: String,

    /// Repository name
    #[serde(default = "default_repo", deserialize_with = "string_or_number")]
    pub repo: String,

    /// Label an issue must carry to be announced
    #[serde(default = "default_label", deserialize_with = "string_or_number")]
    pub label: String,

    /// Base URL of the REST API
    #[serde(default = "default_github_api")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GitHubConfig {
    /// `owner/repo`, as used in search qualifiers and messages.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn default_owner() -> String {
    "python".to_string()
}

fn default_repo() -> String {
    "cpython".to_string()
}

fn default_label() -> String {
    "easy".to_string()
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: default_owner(),
            repo: default_repo(),
            label: default_label(),
            api_base_url: default_github_api(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    #[serde(default, deserialize_with = "string_or_number")]
    pub bot_token: String,

    /// Destination chat: `@channelname` or a numeric id
    #[serde(default, deserialize_with = "string_or_number")]
    pub channel_id: String,

    /// Base URL of the Bot API
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Scalars that providers may type as numbers or booleans but that the
/// config keeps as text (`-1001234567`, a `2048` repository, a `3.13` label).
#[derive(Deserialize)]
#[serde(untagged)]
enum TextScalar {
    Str(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl TextScalar {
    fn into_text(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Signed(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    TextScalar::deserialize(deserializer).map(TextScalar::into_text)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextScalar>::deserialize(deserializer)?.map(TextScalar::into_text))
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_base_url: default_telegram_api(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// Minutes between polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,

    /// Minimum minutes between two "no issues" notices
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_minutes: u64,
}

const fn default_poll_interval() -> u64 {
    30
}

const fn default_heartbeat_interval() -> u64 {
    360
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: default_poll_interval(),
            heartbeat_interval_minutes: default_heartbeat_interval(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection URL understood by sqlx.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

fn default_database_path() -> String {
    "issues.db".to_string()
}

const fn default_max_connections() -> u32 {
    2
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Liveness endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthConfig {
    /// Serve the endpoint at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host to bind to
    #[serde(default = "default_health_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_health_port")]
    pub port: u16,
}

const fn default_true() -> bool {
    true
}

fn default_health_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_health_port() -> u16 {
    8080
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_health_host(),
            port: default_health_port(),
        }
    }
}
