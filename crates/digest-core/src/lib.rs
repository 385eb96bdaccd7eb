//! stardigest core - the delivery side shared by every transport.
//!
//! - **config**: explicit configuration built once from the environment
//! - **transport**: the [`Transport`] trait implemented by the email and
//!   Telegram crates
//! - **controller**: the [`CycleController`] that picks, delivers and records
//!   one summary per invocation

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;

pub use config::{
    load_env_files, Config, HarvestSettings, SmtpSettings, SummarizerSettings, TelegramSettings,
};
pub use controller::{queue_status, CycleController, QueueStatus};
pub use error::{ConfigError, ControllerError, Result};
pub use transport::{Transport, TransportError};
