//! Telegram Bot API request and response models.

use serde::{Deserialize, Serialize};

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// `@channelusername` or a numeric chat id.
    pub chat_id: String,
    pub text: String,
    pub parse_mode: String,
    #[serde(default)]
    pub disable_web_page_preview: bool,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

/// The bot account, as returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
}
