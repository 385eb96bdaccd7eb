//! Telegram delivery for stardigest.
//!
//! Summaries are converted to Telegram's HTML subset, split into labelled
//! parts when longer than one message, and sent through the Bot API. The
//! raw markdown can also be attached as a document.
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: bot token from @BotFather
//! - `TELEGRAM_CHAT_ID`: numeric chat id or `@channelusername`
//! - `TELEGRAM_SEND_DOCUMENT`: attach the markdown file (default: true)

pub mod error;
pub mod format;
pub mod split;
pub mod transport;

pub use error::{Result, TelegramError};
pub use format::{format_summary, markdown_to_telegram_html};
pub use split::{into_parts, split_message, MAX_MESSAGE_LEN};
pub use transport::{parse_recipient, TelegramTransport};
