//! Configuration for stardigest.
//!
//! Configuration is read once at process start into a [`Config`] and passed
//! by reference. Credentials are resolved per command, so sending on one
//! channel never requires the other channel's secrets.
//!
//! # Storage Structure
//!
//! ```text
//! github_docs/          # STARDIGEST_DOCS_DIR: copied docs + SUMMARY.md per repo
//! tmp_repos/            # STARDIGEST_CLONE_DIR: shallow clones, removed after use
//! ./                    # STARDIGEST_STATE_DIR
//! ├── summary_queue.json
//! ├── sent_summaries.json
//! ├── summary_queue_telegram.json
//! └── sent_summaries_telegram.json
//! ```
//!
//! # Environment Variables
//!
//! - `STARDIGEST_DOCS_DIR`, `STARDIGEST_STATE_DIR`, `STARDIGEST_CLONE_DIR`
//! - Email: `SMTP_HOST`, `SMTP_PORT`, `GMAIL_USER`, `SMTP_API`, `RECIPIENT_EMAIL`
//! - Telegram: `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, `TELEGRAM_SEND_DOCUMENT`
//! - Harvest: `GIT_TOKEN`, `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`,
//!   `STARDIGEST_REPO_PAUSE_SECS`

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use digest_models::Channel;
use digest_persistence::{QueueStore, SentLogStore, SummaryStore};
use tracing::debug;

use crate::error::ConfigError;

pub const DOCS_DIR_ENV: &str = "STARDIGEST_DOCS_DIR";
pub const STATE_DIR_ENV: &str = "STARDIGEST_STATE_DIR";
pub const CLONE_DIR_ENV: &str = "STARDIGEST_CLONE_DIR";
pub const REPO_PAUSE_ENV: &str = "STARDIGEST_REPO_PAUSE_SECS";

pub const SMTP_HOST_ENV: &str = "SMTP_HOST";
pub const SMTP_PORT_ENV: &str = "SMTP_PORT";
pub const SMTP_USER_ENV: &str = "GMAIL_USER";
pub const SMTP_PASSWORD_ENV: &str = "SMTP_API";
pub const RECIPIENT_ENV: &str = "RECIPIENT_EMAIL";

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ENV: &str = "TELEGRAM_CHAT_ID";
pub const TELEGRAM_DOCUMENT_ENV: &str = "TELEGRAM_SEND_DOCUMENT";

pub const GITHUB_TOKEN_ENV: &str = "GIT_TOKEN";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const ALL_VARS: &[&str] = &[
    DOCS_DIR_ENV,
    STATE_DIR_ENV,
    CLONE_DIR_ENV,
    REPO_PAUSE_ENV,
    SMTP_HOST_ENV,
    SMTP_PORT_ENV,
    SMTP_USER_ENV,
    SMTP_PASSWORD_ENV,
    RECIPIENT_ENV,
    TELEGRAM_TOKEN_ENV,
    TELEGRAM_CHAT_ENV,
    TELEGRAM_DOCUMENT_ENV,
    GITHUB_TOKEN_ENV,
    OPENAI_KEY_ENV,
    OPENAI_MODEL_ENV,
    OPENAI_BASE_URL_ENV,
];

const DEFAULT_DOCS_DIR: &str = "github_docs";
const DEFAULT_STATE_DIR: &str = ".";
const DEFAULT_CLONE_DIR: &str = "tmp_repos";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_REPO_PAUSE_SECS: u64 = 60;

/// Default summarization model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Loads `.env.local` and then `.env` from the working directory.
///
/// Variables already set in the process environment are never overridden.
pub fn load_env_files() {
    for name in [".env.local", ".env"] {
        if let Ok(path) = dotenvy::from_filename(name) {
            debug!(path = %path.display(), "Loaded environment file");
        }
    }
}

/// Process-wide configuration.
#[derive(Clone)]
pub struct Config {
    /// Where copied docs and `SUMMARY.md` files live.
    pub docs_dir: PathBuf,
    /// Where queue and sent-log documents live.
    pub state_dir: PathBuf,
    /// Scratch directory for clones.
    pub clone_dir: PathBuf,
    vars: BTreeMap<&'static str, String>,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars: BTreeMap<&'static str, String> = ALL_VARS
            .iter()
            .filter_map(|name| {
                lookup(name)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (*name, v))
            })
            .collect();

        let dir = |name: &'static str, default: &str| {
            let raw = vars.get(name).map(String::as_str).unwrap_or(default);
            PathBuf::from(shellexpand::tilde(raw).into_owned())
        };

        Self {
            docs_dir: dir(DOCS_DIR_ENV, DEFAULT_DOCS_DIR),
            state_dir: dir(STATE_DIR_ENV, DEFAULT_STATE_DIR),
            clone_dir: dir(CLONE_DIR_ENV, DEFAULT_CLONE_DIR),
            vars,
        }
    }

    pub fn summary_store(&self) -> SummaryStore {
        SummaryStore::new(&self.docs_dir)
    }

    pub fn queue_store(&self, channel: Channel) -> QueueStore {
        QueueStore::for_channel(&self.state_dir, channel)
    }

    pub fn sent_log_store(&self, channel: Channel) -> SentLogStore {
        SentLogStore::for_channel(&self.state_dir, channel)
    }

    /// SMTP settings for the email channel.
    pub fn smtp(&self) -> Result<SmtpSettings, ConfigError> {
        let port = match self.get(SMTP_PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: SMTP_PORT_ENV,
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(SmtpSettings {
            host: self.require(SMTP_HOST_ENV)?,
            port,
            username: self.require(SMTP_USER_ENV)?,
            password: self.require(SMTP_PASSWORD_ENV)?,
            recipient: self.require(RECIPIENT_ENV)?,
        })
    }

    /// Bot settings for the Telegram channel.
    pub fn telegram(&self) -> Result<TelegramSettings, ConfigError> {
        Ok(TelegramSettings {
            bot_token: self.require(TELEGRAM_TOKEN_ENV)?,
            chat_id: self.require(TELEGRAM_CHAT_ENV)?,
            send_document: self.flag(TELEGRAM_DOCUMENT_ENV, true)?,
        })
    }

    /// Settings for the harvest pipeline.
    pub fn harvest(&self) -> Result<HarvestSettings, ConfigError> {
        let pause_secs = match self.get(REPO_PAUSE_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: REPO_PAUSE_ENV,
                reason: format!("'{}' is not a number of seconds", raw),
            })?,
            None => DEFAULT_REPO_PAUSE_SECS,
        };

        Ok(HarvestSettings {
            github_token: self.require(GITHUB_TOKEN_ENV)?,
            summarizer: SummarizerSettings {
                api_key: self.require(OPENAI_KEY_ENV)?,
                model: self.get(OPENAI_MODEL_ENV).unwrap_or(DEFAULT_MODEL).to_string(),
                base_url: self
                    .get(OPENAI_BASE_URL_ENV)
                    .unwrap_or(DEFAULT_OPENAI_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            repo_pause: Duration::from_secs(pause_secs),
        })
    }

    fn get(&self, name: &'static str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn require(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name)
            .map(str::to_string)
            .ok_or(ConfigError::MissingVar(name))
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name).map(str::to_ascii_lowercase).as_deref() {
            None => Ok(default),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some("0" | "false" | "no" | "off") => Ok(false),
            Some(other) => Err(ConfigError::InvalidVar {
                name,
                reason: format!("'{}' is not a boolean", other),
            }),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("docs_dir", &self.docs_dir)
            .field("state_dir", &self.state_dir)
            .field("clone_dir", &self.clone_dir)
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Authenticated SMTP submission with STARTTLS.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub recipient: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

#[derive(Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    /// Numeric chat id or `@channelusername`.
    pub chat_id: String,
    /// Also attach the full summary as a markdown document.
    pub send_document: bool,
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("send_document", &self.send_document)
            .finish()
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct SummarizerSettings {
    pub api_key: String,
    pub model: String,
    /// API base without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
}

impl fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct HarvestSettings {
    pub github_token: String,
    pub summarizer: SummarizerSettings,
    /// Pause after a repository that produced no summary.
    pub repo_pause: Duration,
}

impl fmt::Debug for HarvestSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestSettings")
            .field("github_token", &"<redacted>")
            .field("summarizer", &self.summarizer)
            .field("repo_pause", &self.repo_pause)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_default_paths() {
        let cfg = config(&[]);
        assert_eq!(cfg.docs_dir, PathBuf::from("github_docs"));
        assert_eq!(cfg.state_dir, PathBuf::from("."));
        assert_eq!(cfg.clone_dir, PathBuf::from("tmp_repos"));
    }

    #[test]
    fn test_path_overrides() {
        let cfg = config(&[(DOCS_DIR_ENV, "/srv/docs"), (STATE_DIR_ENV, "/srv/state")]);
        assert_eq!(cfg.docs_dir, PathBuf::from("/srv/docs"));
        assert!(cfg
            .queue_store(Channel::Email)
            .path()
            .ends_with("summary_queue.json"));
        assert!(cfg
            .sent_log_store(Channel::Telegram)
            .path()
            .starts_with("/srv/state"));
    }

    #[test]
    fn test_smtp_requires_credentials() {
        let cfg = config(&[(SMTP_HOST_ENV, "smtp.example.com")]);
        let err = cfg.smtp().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(SMTP_USER_ENV)));
    }

    #[test]
    fn test_smtp_defaults_port() {
        let cfg = config(&[
            (SMTP_HOST_ENV, "smtp.example.com"),
            (SMTP_USER_ENV, "me@example.com"),
            (SMTP_PASSWORD_ENV, "secret"),
            (RECIPIENT_ENV, "you@example.com"),
        ]);
        let smtp = cfg.smtp().unwrap();
        assert_eq!(smtp.port, 587);
        assert!(!format!("{:?}", smtp).contains("secret"));
    }

    #[test]
    fn test_smtp_rejects_bad_port() {
        let cfg = config(&[
            (SMTP_HOST_ENV, "smtp.example.com"),
            (SMTP_PORT_ENV, "http"),
            (SMTP_USER_ENV, "me@example.com"),
            (SMTP_PASSWORD_ENV, "secret"),
            (RECIPIENT_ENV, "you@example.com"),
        ]);
        assert!(matches!(
            cfg.smtp(),
            Err(ConfigError::InvalidVar { name: SMTP_PORT_ENV, .. })
        ));
    }

    #[test]
    fn test_empty_value_is_missing() {
        let cfg = config(&[(TELEGRAM_TOKEN_ENV, "  "), (TELEGRAM_CHAT_ENV, "42")]);
        assert!(matches!(
            cfg.telegram(),
            Err(ConfigError::MissingVar(TELEGRAM_TOKEN_ENV))
        ));
    }

    #[test]
    fn test_telegram_document_flag() {
        let base = [(TELEGRAM_TOKEN_ENV, "t"), (TELEGRAM_CHAT_ENV, "42")];
        assert!(config(&base).telegram().unwrap().send_document);

        let off = [base[0], base[1], (TELEGRAM_DOCUMENT_ENV, "false")];
        assert!(!config(&off).telegram().unwrap().send_document);

        let bad = [base[0], base[1], (TELEGRAM_DOCUMENT_ENV, "maybe")];
        assert!(config(&bad).telegram().is_err());
    }

    #[test]
    fn test_harvest_defaults() {
        let cfg = config(&[
            (GITHUB_TOKEN_ENV, "gh"),
            (OPENAI_KEY_ENV, "sk"),
            (OPENAI_BASE_URL_ENV, "http://localhost:8080/v1/"),
        ]);
        let harvest = cfg.harvest().unwrap();
        assert_eq!(harvest.summarizer.model, DEFAULT_MODEL);
        assert_eq!(harvest.summarizer.base_url, "http://localhost:8080/v1");
        assert_eq!(harvest.repo_pause, Duration::from_secs(60));
    }
}
