use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SCRUBBER: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Redact credentials from `message` using the shared scrubber.
///
/// Transport errors from reqwest include the request URL, and Bot API
/// URLs carry the bot token, so every remote error goes through here
/// before it is logged.
pub fn scrub_secrets(message: &str) -> String {
    SCRUBBER.scrub_message(message)
}

/// Scrubs sensitive data from log messages
#[derive(Clone)]
pub struct SecretScrubber {
    bot_token_pattern: Regex,
    github_token_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            // Telegram bot tokens as they appear in Bot API URLs: bot123456:AA...
            bot_token_pattern: Regex::new(r"bot\d+:[A-Za-z0-9_-]+").unwrap(),
            // Classic and fine-grained GitHub tokens
            github_token_pattern: Regex::new(
                r"\b(?:gh[pousr]_[A-Za-z0-9]{20,}|github_pat_[A-Za-z0-9_]{20,})",
            )
            .unwrap(),
            // Match generic tokens
            token_pattern: Regex::new(concat!(
                r#"["']?(?:api_key|apikey|token|secret)["']?"#,
                r#"\s*[:=]\s*["']?([a-zA-Z0-9-_\.]{20,})["']?"#,
            ))
            .unwrap(),
            // Match Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9-_\.]+").unwrap(),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = self
            .bot_token_pattern
            .replace_all(message, "bot[TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .github_token_pattern
            .replace_all(&scrubbed, "[TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:[REDACTED]", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}=[REDACTED]", &full_match[..eq_pos])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
        scrubbed
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
