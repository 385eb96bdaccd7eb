//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use digest_models::Channel;

/// stardigest - daily documentation digests of your starred repositories
#[derive(Parser, Debug)]
#[command(name = "stardigest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding queue and sent-log files (overrides STARDIGEST_STATE_DIR)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Directory holding harvested docs and summaries (overrides STARDIGEST_DOCS_DIR)
    #[arg(long, global = true)]
    pub docs_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver the next summary on a channel
    Send {
        #[arg(short, long, value_enum)]
        channel: ChannelArg,
    },

    /// Show a channel's delivery state without changing it
    Status {
        #[arg(short, long, value_enum)]
        channel: ChannelArg,
    },

    /// Fetch starred repositories and generate missing summaries
    Harvest,

    /// Send a plain test message using the SMTP settings
    TestEmail,
}

/// Delivery channel as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelArg {
    Email,
    Telegram,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Email => Channel::Email,
            ChannelArg::Telegram => Channel::Telegram,
        }
    }
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
