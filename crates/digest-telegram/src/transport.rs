//! Delivery through the Telegram Bot API.

use async_trait::async_trait;
use chrono::Local;
use digest_core::{TelegramSettings, Transport, TransportError};
use digest_models::{Channel, Progress, SummaryItem};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, Recipient};
use tracing::{debug, info, warn};

use crate::error::{Result, TelegramError};
use crate::format::{document_caption, format_summary};
use crate::split::{into_parts, MAX_MESSAGE_LEN};

/// Sends summaries to one chat or channel.
pub struct TelegramTransport {
    bot: Bot,
    chat: Recipient,
    send_document: bool,
}

impl TelegramTransport {
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        Ok(Self {
            bot: Bot::new(&settings.bot_token),
            chat: parse_recipient(&settings.chat_id)?,
            send_document: settings.send_document,
        })
    }

    /// Attaches the raw markdown as `<key>_summary_<yyyymmdd>.md`.
    async fn send_summary_document(&self, item: &SummaryItem) -> Result<()> {
        let file_name = format!(
            "{}_summary_{}.md",
            item.key,
            Local::now().format("%Y%m%d")
        );
        let file = InputFile::memory(item.content.clone().into_bytes()).file_name(file_name);

        self.bot
            .send_document(self.chat.clone(), file)
            .caption(document_caption(item))
            .parse_mode(ParseMode::Html)
            .await?;
        debug!(key = %item.key, "Sent summary document");
        Ok(())
    }

    /// Sends every part in order, stopping at the first failure.
    async fn send_parts(&self, parts: &[String]) -> Result<()> {
        for (i, part) in parts.iter().enumerate() {
            self.bot
                .send_message(self.chat.clone(), part.as_str())
                .parse_mode(ParseMode::Html)
                .await
                .map_err(|e| {
                    warn!(part = i + 1, total = parts.len(), error = %e, "Message part failed");
                    e
                })?;
            debug!(part = i + 1, total = parts.len(), "Sent message part");
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    async fn deliver(
        &self,
        item: &SummaryItem,
        progress: Progress,
    ) -> std::result::Result<(), TransportError> {
        let text = format_summary(item, progress, Local::now().date_naive());
        let parts = into_parts(&text, MAX_MESSAGE_LEN);

        if self.send_document {
            self.send_summary_document(item)
                .await
                .map_err(|e| TransportError::Send(e.to_string()))?;
        }

        self.send_parts(&parts)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        info!(key = %item.key, parts = parts.len(), "Telegram summary sent");
        Ok(())
    }
}

/// Parses a numeric chat id or an `@channelusername`.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    chat_id
        .parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|_| TelegramError::InvalidChatId(chat_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_chat() {
        assert_eq!(
            parse_recipient("-1001234567890").unwrap(),
            Recipient::Id(ChatId(-1001234567890))
        );
    }

    #[test]
    fn test_parse_channel_username() {
        assert_eq!(
            parse_recipient("@stardigest").unwrap(),
            Recipient::ChannelUsername("@stardigest".into())
        );
    }

    #[test]
    fn test_rejects_bad_chat() {
        assert!(matches!(
            parse_recipient("stardigest"),
            Err(TelegramError::InvalidChatId(_))
        ));
        assert!(parse_recipient("@").is_err());
    }

    #[test]
    fn test_transport_channel() {
        let transport = TelegramTransport::new(&TelegramSettings {
            bot_token: "123:abc".into(),
            chat_id: "42".into(),
            send_document: false,
        })
        .unwrap();
        assert_eq!(transport.channel(), Channel::Telegram);
    }
}
