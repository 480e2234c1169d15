//! Telegram Bot API adapter.
//!
//! Delivers announcements to a single channel through `sendMessage`
//! with HTML formatting enabled.

pub mod client;
pub mod models;

pub use client::TelegramNotifier;
