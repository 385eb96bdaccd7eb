//! Delivery channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A delivery transport. Each channel keeps its own queue and sent log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Telegram,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Telegram => "telegram",
        }
    }

    /// File name of this channel's queue document.
    pub fn queue_file_name(&self) -> &'static str {
        match self {
            Channel::Email => "summary_queue.json",
            Channel::Telegram => "summary_queue_telegram.json",
        }
    }

    /// File name of this channel's sent-log document.
    pub fn sent_log_file_name(&self) -> &'static str {
        match self {
            Channel::Email => "sent_summaries.json",
            Channel::Telegram => "sent_summaries_telegram.json",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "mail" => Ok(Channel::Email),
            "telegram" => Ok(Channel::Telegram),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}
