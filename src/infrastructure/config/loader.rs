use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::logging::logger::parse_log_level;

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "issue-herald.yaml";

/// Prefix for structured environment overrides (`HERALD_GITHUB__LABEL`).
const ENV_PREFIX: &str = "HERALD_";

/// Unprefixed deployment variables and the key each one sets.
const DEPLOYMENT_VARS: [(&str, &str); 10] = [
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_OWNER", "github.owner"),
    ("GITHUB_REPO", "github.repo"),
    ("GITHUB_LABEL", "github.label"),
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHANNEL_ID", "telegram.channel_id"),
    ("CHECK_INTERVAL_MINUTES", "schedule.poll_interval_minutes"),
    ("NOTIFICATION_INTERVAL_MINUTES", "schedule.heartbeat_interval_minutes"),
    ("DB_PATH", "database.path"),
    ("PORT", "health.port"),
];

/// Keys whose values are text even when they look like numbers.
const TEXT_SETTINGS: [&str; 7] = [
    "github.token",
    "github.owner",
    "github.repo",
    "github.label",
    "telegram.bot_token",
    "telegram.channel_id",
    "database.path",
];

/// `github.label` -> `HERALD_GITHUB__LABEL`
fn prefixed_name(path: &str) -> String {
    format!("{ENV_PREFIX}{}", path.replace('.', "__").to_ascii_uppercase())
}

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid poll interval: {0} minutes. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid heartbeat interval: {0} minutes. Must be at least 1")]
    InvalidHeartbeatInterval(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("GitHub {0} cannot be empty")]
    EmptyGitHubField(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML file (`path`, or `issue-herald.yaml` when absent; optional)
    /// 3. Plain deployment variables (`GITHUB_TOKEN`, `CHECK_INTERVAL_MINUTES`, ...)
    /// 4. Environment variables (HERALD_* prefix, highest priority)
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config: Config = Self::figment(path)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider stack, before extraction.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(
            || Path::new(DEFAULT_CONFIG_FILE).to_path_buf(),
            Path::to_path_buf,
        );

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Self::deployment_env());
        let figment = Self::merge_text_settings(figment, |name, _| name.to_string());
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::merge_text_settings(figment, |_, key| prefixed_name(key))
    }

    /// Unprefixed variable names used by existing deployments.
    fn deployment_env() -> Env {
        Env::raw().filter_map(|key| {
            DEPLOYMENT_VARS
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| (*path).into())
        })
    }

    /// Re-merge free-text settings verbatim.
    ///
    /// `Env` parses `3.10` as the float `3.1`; labels, repository names and
    /// tokens must reach the config exactly as written.
    fn merge_text_settings<F>(figment: Figment, var_name: F) -> Figment
    where
        F: Fn(&str, &str) -> String,
    {
        DEPLOYMENT_VARS
            .iter()
            .filter(|(_, path)| TEXT_SETTINGS.contains(path))
            .fold(figment, |figment, &(name, path)| {
                match std::env::var(var_name(name, path)) {
                    Ok(value) => figment.merge(Serialized::default(path, value)),
                    Err(_) => figment,
                }
            })
    }

    /// Validate configuration after loading
    ///
    /// Credentials are deliberately not checked here; a missing token
    /// surfaces as failed fetches or sends at runtime.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.schedule.poll_interval_minutes == 0 {
            return Err(ConfigError::InvalidPollInterval(config.schedule.poll_interval_minutes));
        }

        if config.schedule.heartbeat_interval_minutes == 0 {
            return Err(ConfigError::InvalidHeartbeatInterval(
                config.schedule.heartbeat_interval_minutes,
            ));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        if parse_log_level(&config.logging.level).is_err() {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        for (field, value) in [
            ("owner", &config.github.owner),
            ("repo", &config.github.repo),
            ("label", &config.github.label),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyGitHubField(field));
            }
        }

        Ok(())
    }
}
