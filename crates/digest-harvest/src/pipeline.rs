//! The harvest pipeline: one summary per starred repository.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use digest_persistence::atomic::atomic_write;
use digest_persistence::SummaryStore;
use tracing::{error, info, warn};
use url::Url;

use crate::acquire::{
    clone_repo, copy_docs, existing_docs, find_doc_files, read_docs_content, MAX_CONTENT_CHARS,
};
use crate::error::{HarvestError, Result};
use crate::summarize::Summarize;

/// What happened to one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOutcome {
    /// A summary was already on disk.
    AlreadySummarized,
    /// A new summary was written.
    Summarized,
    /// The repository has no documentation files.
    NoDocs,
    /// Docs were found but the summarizer produced nothing.
    NotSummarized,
}

/// Totals for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub total: usize,
    /// Repositories handled without error.
    pub processed: usize,
    /// New summaries written.
    pub summarized: usize,
}

/// Derives the item key `owner_repo` from a repository URL.
pub fn repo_key(repo_url: &str) -> Result<String> {
    let invalid = || HarvestError::InvalidRepoUrl(repo_url.to_string());
    let url = Url::parse(repo_url).map_err(|_| invalid())?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., owner, repo] => Ok(format!("{}_{}", owner, repo.trim_end_matches(".git"))),
        _ => Err(invalid()),
    }
}

/// The `SUMMARY.md` document for a generated summary.
pub fn summary_document(key: &str, summary: &str) -> String {
    format!(
        "# Detailed Summary: {}\n\n*Auto-generated comprehensive documentation summary*\n\n---\n\n{}",
        key, summary
    )
}

/// Runs acquisition and summarization for a list of repositories.
///
/// # Layout
///
/// ```text
/// docs_dir/<owner_repo>/...          # copied docs, relative paths kept
/// docs_dir/<owner_repo>/SUMMARY.md   # written last
/// clone_dir/<owner_repo>/            # shallow clone, removed after use
/// ```
pub struct Harvester<S> {
    summarizer: S,
    summaries: SummaryStore,
    clone_dir: PathBuf,
    pause: Duration,
}

impl<S: Summarize> Harvester<S> {
    pub fn new(
        summarizer: S,
        docs_dir: impl Into<PathBuf>,
        clone_dir: impl Into<PathBuf>,
        pause: Duration,
    ) -> Self {
        Self {
            summarizer,
            summaries: SummaryStore::new(docs_dir),
            clone_dir: clone_dir.into(),
            pause,
        }
    }

    /// Processes every repository in order.
    ///
    /// Per-repository failures are logged and skipped. After a repository
    /// that ended without a summary the harvester pauses before the next one.
    pub async fn run(&self, repo_urls: &[String]) -> Result<HarvestReport> {
        let docs_dir = self.summaries.docs_dir();
        fs::create_dir_all(docs_dir).map_err(|e| HarvestError::io(docs_dir, e))?;
        fs::create_dir_all(&self.clone_dir).map_err(|e| HarvestError::io(&self.clone_dir, e))?;

        let mut report = HarvestReport {
            total: repo_urls.len(),
            ..Default::default()
        };

        for (i, url) in repo_urls.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, report.total, url);

            match self.process_repo(url).await {
                Ok(outcome) => {
                    report.processed += 1;
                    if outcome == RepoOutcome::Summarized {
                        report.summarized += 1;
                    }
                }
                Err(e) => error!(url = %url, error = %e, "Failed to process repository"),
            }

            let is_last = i + 1 == repo_urls.len();
            if !is_last && !self.pause.is_zero() && !self.has_summary(url) {
                info!(secs = self.pause.as_secs(), "Pausing before next repository");
                tokio::time::sleep(self.pause).await;
            }
        }

        remove_dir(&self.clone_dir);
        info!(
            processed = report.processed,
            total = report.total,
            summarized = report.summarized,
            docs = %docs_dir.display(),
            "Harvest complete"
        );
        Ok(report)
    }

    /// Brings one repository up to date.
    pub async fn process_repo(&self, repo_url: &str) -> Result<RepoOutcome> {
        let key = repo_key(repo_url)?;
        let dest = self.summaries.docs_dir().join(&key);

        if self.summaries.summary_path(&key).exists() {
            info!(repo = %key, "Summary already exists, skipping");
            return Ok(RepoOutcome::AlreadySummarized);
        }

        let existing = existing_docs(&dest);
        if !existing.is_empty() {
            info!(repo = %key, files = existing.len(), "Docs already copied, summarizing");
            return self.summarize_files(&key, &existing).await;
        }

        let clone_path = self.clone_dir.join(&key);
        remove_dir(&clone_path);
        clone_repo(repo_url, &clone_path).await?;

        let files = find_doc_files(&clone_path);
        let outcome = if files.is_empty() {
            warn!(repo = %key, "No documentation found");
            Ok(RepoOutcome::NoDocs)
        } else {
            let copied = copy_docs(&files, &clone_path, &dest);
            info!(repo = %key, found = files.len(), copied, "Copied documentation");
            self.summarize_files(&key, &files).await
        };

        remove_dir(&clone_path);
        outcome
    }

    async fn summarize_files(&self, key: &str, files: &[PathBuf]) -> Result<RepoOutcome> {
        let content = read_docs_content(files, MAX_CONTENT_CHARS);
        let Some(summary) = self.summarizer.summarize(&content, key).await else {
            return Ok(RepoOutcome::NotSummarized);
        };

        let path = self.summaries.summary_path(key);
        atomic_write(&path, summary_document(key, &summary).as_bytes())?;
        info!(repo = %key, path = %path.display(), chars = summary.len(), "Saved summary");
        Ok(RepoOutcome::Summarized)
    }

    fn has_summary(&self, repo_url: &str) -> bool {
        repo_key(repo_url)
            .map(|key| self.summaries.summary_path(&key).exists())
            .unwrap_or(false)
    }
}

fn remove_dir(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove directory"),
    }
}
