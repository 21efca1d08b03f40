//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Authentication against the Bot API failed.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// The long-poll update feed could not be acquired.
    #[error("Failed to acquire update feed: {0}")]
    FeedUnavailable(String),

    /// An outbound request failed.
    #[error("Failed to send: {0}")]
    SendFailed(String),

    /// Invalid configuration.
    #[error(transparent)]
    Core(#[from] capsule_core::CapsuleError),

    /// Shutdown did not complete cleanly.
    #[error("Shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<teloxide::RequestError> for TelegramError {
    fn from(e: teloxide::RequestError) -> Self {
        TelegramError::SendFailed(e.to_string())
    }
}
