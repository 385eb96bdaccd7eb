//! stardigest CLI entry point.

mod cli;
mod commands;

use clap::Parser;
use digest_core::Config;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    digest_core::load_env_files();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::from_env();
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }
    if let Some(docs_dir) = cli.docs_dir {
        config.docs_dir = docs_dir;
    }

    if let Err(e) = commands::execute(cli.command, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
