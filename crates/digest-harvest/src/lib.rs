//! Documentation harvest for stardigest.
//!
//! Fetches the authenticated user's starred repositories, shallow-clones
//! each one, copies its documentation into the docs directory, and writes a
//! `SUMMARY.md` produced by an OpenAI-compatible chat model. The delivery
//! side picks those summaries up on its next run.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use digest_core::Config;
//! use digest_harvest::{GitHubClient, Harvester, OpenAiSummarizer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let settings = config.harvest()?;
//!
//! let urls = GitHubClient::new(&settings.github_token).starred_repo_urls().await;
//! let harvester = Harvester::new(
//!     OpenAiSummarizer::new(settings.summarizer.clone()),
//!     &config.docs_dir,
//!     &config.clone_dir,
//!     Duration::from_secs(60),
//! );
//! let report = harvester.run(&urls).await?;
//! println!("{} new summaries", report.summarized);
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod summarize;

pub use error::{HarvestError, Result};
pub use github::GitHubClient;
pub use pipeline::{repo_key, HarvestReport, Harvester, RepoOutcome};
pub use summarize::{OpenAiSummarizer, Summarize, SummarizerError};
