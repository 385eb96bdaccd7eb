//! Command handlers for CLI subcommands.

use digest_core::{queue_status, Config, CycleController, Transport};
use digest_email::EmailTransport;
use digest_harvest::{GitHubClient, Harvester, OpenAiSummarizer};
use digest_models::{Channel, Outcome};
use digest_telegram::TelegramTransport;
use tracing::info;

use crate::cli::Commands;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
///
/// Only configuration and storage problems are errors. A delivery that
/// fails is reported and left for the next run.
pub async fn execute(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Send { channel } => cmd_send(config, channel.into()).await.map(|_| ()),
        Commands::Status { channel } => cmd_status(config, channel.into()),
        Commands::Harvest => cmd_harvest(config).await,
        Commands::TestEmail => cmd_test_email(config).await,
    }
}

async fn cmd_send(config: &Config, channel: Channel) -> Result<Outcome> {
    // Transports validate their settings before any state is touched
    let outcome = match channel {
        Channel::Email => deliver(config, EmailTransport::new(&config.smtp()?)?).await?,
        Channel::Telegram => deliver(config, TelegramTransport::new(&config.telegram()?)?).await?,
    };

    match &outcome {
        Outcome::Sent(key) => println!("Sent {} via {}", key, channel),
        Outcome::Idle => println!("Nothing to send via {}", channel),
        Outcome::Failed { key, reason } => {
            println!("Failed to send {} via {}: {}", key, channel, reason);
            println!("It stays at the head of the queue and will be retried next run.");
        }
    }
    Ok(outcome)
}

async fn deliver<T: Transport>(config: &Config, transport: T) -> Result<Outcome> {
    let outcome = CycleController::new(config, transport)
        .run_one_delivery()
        .await?;
    Ok(outcome)
}

fn cmd_status(config: &Config, channel: Channel) -> Result<()> {
    let status = queue_status(config, channel)?;

    println!("Channel:    {}", status.channel);
    println!("Phase:      {}", status.phase);
    println!("Available:  {} summaries", status.available);
    println!("Pending:    {}", status.pending.len());
    for (i, key) in status.pending.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, key);
    }
    println!("History:    {} sent this cycle", status.history);
    println!("Sent log:   {} entries", status.sent_logged);
    Ok(())
}

async fn cmd_harvest(config: &Config) -> Result<()> {
    let settings = config.harvest()?;

    info!("Fetching starred repositories");
    let urls = GitHubClient::new(&settings.github_token)
        .starred_repo_urls()
        .await;
    info!(count = urls.len(), "Found starred repositories");

    let harvester = Harvester::new(
        OpenAiSummarizer::new(settings.summarizer.clone()),
        &config.docs_dir,
        &config.clone_dir,
        settings.repo_pause,
    );
    let report = harvester.run(&urls).await?;

    println!(
        "Processed {}/{} repositories, {} new summaries in {}",
        report.processed,
        report.total,
        report.summarized,
        config.docs_dir.display()
    );
    Ok(())
}

async fn cmd_test_email(config: &Config) -> Result<()> {
    let settings = config.smtp()?;
    EmailTransport::new(&settings)?.send_test_email().await?;
    println!("Test email sent to {}", settings.recipient);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ChannelArg;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> Config {
        let state = dir.join("state").to_string_lossy().into_owned();
        let docs = dir.join("docs").to_string_lossy().into_owned();
        Config::from_lookup(move |name| match name {
            "STARDIGEST_STATE_DIR" => Some(state.clone()),
            "STARDIGEST_DOCS_DIR" => Some(docs.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_send_without_credentials_touches_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let summary = config.summary_store().summary_path("a_b");
        fs::create_dir_all(summary.parent().unwrap()).unwrap();
        fs::write(&summary, "# a_b").unwrap();

        let result = execute(
            Commands::Send {
                channel: ChannelArg::Telegram,
            },
            &config,
        )
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("TELEGRAM_BOT_TOKEN"), "{}", err);
        assert!(!config.state_dir.exists());
    }

    #[tokio::test]
    async fn test_status_is_read_only() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        execute(
            Commands::Status {
                channel: ChannelArg::Email,
            },
            &config,
        )
        .await
        .unwrap();

        assert!(!config.state_dir.exists());
    }

    #[tokio::test]
    async fn test_harvest_requires_tokens() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let err = execute(Commands::Harvest, &config).await.unwrap_err();

        assert!(err.to_string().contains("GIT_TOKEN"));
    }
}
