//! Telegram Bot API client implementing the [`Notifier`] port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::TelegramConfig;
use crate::domain::ports::Notifier;
use crate::infrastructure::logging::scrub_secrets;

use super::models::{BotUser, SendMessageRequest, TelegramResponse};

/// Base URL for the Telegram Bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Sends announcements to one Telegram chat.
///
/// Every call is a single attempt; the caller decides whether to try
/// again on a later cycle.
#[derive(Debug)]
pub struct TelegramNotifier {
    http: Client,
    base_url: String,
    bot_token: String,
    channel_id: String,
    started: AtomicBool,
}

impl TelegramNotifier {
    /// Create a notifier against the public Bot API.
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> DomainResult<Self> {
        Self::with_base_url(
            TELEGRAM_API_BASE,
            bot_token,
            channel_id,
            Duration::from_secs(30),
        )
    }

    /// Create a notifier from the `telegram` config section.
    pub fn from_config(config: &TelegramConfig) -> DomainResult<Self> {
        Self::with_base_url(
            &config.api_base_url,
            config.bot_token.clone(),
            config.channel_id.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a notifier against an arbitrary base URL (local Bot API server, tests).
    pub fn with_base_url(
        base_url: &str,
        bot_token: impl Into<String>,
        channel_id: impl Into<String>,
        timeout: Duration,
    ) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::Configuration(format!("failed to build Telegram HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            started: AtomicBool::new(false),
        })
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    /// Look up the bot account behind the configured token.
    pub async fn get_me(&self) -> DomainResult<BotUser> {
        let resp = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("Telegram getMe request failed: {e}")))?;

        let status = resp.status();
        let body: TelegramResponse<BotUser> = resp.json().await.map_err(|e| {
            DomainError::Remote(format!(
                "Telegram getMe returned {status} with unreadable body: {e}"
            ))
        })?;

        match body.result {
            Some(user) if body.ok => Ok(user),
            _ => Err(DomainError::Remote(format!(
                "Telegram getMe returned {status}: {}",
                body.description.unwrap_or_default()
            ))),
        }
    }

    async fn send_message(&self, text: &str) -> DomainResult<()> {
        if !self.is_started() {
            return Err(DomainError::Usage(
                "Telegram notifier used before start()".to_string(),
            ));
        }

        let request = SendMessageRequest {
            chat_id: self.channel_id.clone(),
            text: text.to_string(),
            parse_mode: "HTML".to_string(),
            disable_web_page_preview: false,
        };

        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("Telegram sendMessage request failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(DomainError::Remote(format!(
                "Telegram sendMessage returned {status}: {body}"
            )));
        }

        let parsed: TelegramResponse<serde_json::Value> = serde_json::from_str(&body)?;
        if parsed.ok {
            Ok(())
        } else {
            Err(DomainError::Remote(format!(
                "Telegram rejected message: {}",
                parsed.description.unwrap_or_default()
            )))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn start(&self) -> DomainResult<()> {
        tracing::info!(channel = %self.channel_id, "starting Telegram notifier");
        self.started.store(true, Ordering::Release);

        let user = self
            .get_me()
            .await
            .map_err(|e| DomainError::Remote(scrub_secrets(&e.to_string())))?;
        tracing::info!(bot_id = user.id, username = ?user.username, "Telegram bot verified");
        Ok(())
    }

    async fn send(&self, text: &str) -> bool {
        match self.send_message(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %scrub_secrets(&e.to_string()),
                    "error sending message to Telegram"
                );
                false
            }
        }
    }

    async fn stop(&self) {
        tracing::info!("stopping Telegram notifier");
        self.started.store(false, Ordering::Release);
    }
}
