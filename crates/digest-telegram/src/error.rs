//! Error types for the Telegram transport.

use thiserror::Error;

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// `TELEGRAM_CHAT_ID` is neither a numeric id nor an `@channel` name.
    #[error("Invalid chat id '{0}': expected a number or @channelusername")]
    InvalidChatId(String),

    /// The Bot API rejected a request or could not be reached.
    #[error("Telegram API error: {0}")]
    Request(#[from] teloxide::RequestError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
