//! Summary store: the generated summaries available for delivery.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use digest_models::{Catalog, SummaryItem};
use tracing::{debug, warn};

/// File name of a generated summary inside a repository's docs directory.
pub const SUMMARY_FILE_NAME: &str = "SUMMARY.md";

/// Scans the docs directory for summaries.
///
/// ```text
/// docs_dir/
/// ├── tokio-rs_tokio/
/// │   ├── README.md
/// │   └── SUMMARY.md      -> key "tokio-rs_tokio"
/// └── serde-rs_serde/
///     └── SUMMARY.md      -> key "serde-rs_serde"
/// ```
///
/// Every call re-scans the directory; nothing is cached.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    docs_dir: PathBuf,
}

impl SummaryStore {
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
        }
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Where the summary for `key` lives.
    pub fn summary_path(&self, key: &str) -> PathBuf {
        self.docs_dir.join(key).join(SUMMARY_FILE_NAME)
    }

    /// Lists every readable summary, keyed by its parent directory name.
    ///
    /// A missing docs directory yields an empty catalog. Unreadable files are
    /// skipped. When two summaries share a key, the lexically first path wins.
    pub fn list_available(&self) -> Catalog {
        let mut paths = Vec::new();
        collect_summary_files(&self.docs_dir, &mut paths);
        paths.sort();

        let mut catalog = Catalog::new();
        for path in paths {
            let Some(key) = summary_key(&path) else {
                continue;
            };
            if catalog.contains(&key) {
                warn!(key = %key, path = %path.display(), "Duplicate summary key, ignoring");
                continue;
            }
            match read_summary(&path, &key) {
                Ok(item) => {
                    catalog.insert(item);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable summary");
                }
            }
        }

        debug!(dir = %self.docs_dir.display(), count = catalog.len(), "Scanned summaries");
        catalog
    }
}

fn summary_key(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()?
        .to_str()
        .map(|name| name.to_string())
}

fn read_summary(path: &Path, key: &str) -> std::io::Result<SummaryItem> {
    let content = fs::read_to_string(path)?;
    let modified_at: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
    Ok(SummaryItem::new(key, content, modified_at))
}

fn collect_summary_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                warn!(dir = %dir.display(), error = %e, "Cannot read directory");
            }
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            collect_summary_files(&path, out);
        } else if file_type.is_file() && entry.file_name() == SUMMARY_FILE_NAME {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = SummaryStore::new(dir.path().join("github_docs"));
        assert!(store.list_available().is_empty());
    }

    #[test]
    fn test_lists_summaries_by_parent_dir() {
        let dir = tempdir().unwrap();
        let store = SummaryStore::new(dir.path());
        write(&store.summary_path("tokio-rs_tokio"), b"# Tokio");
        write(&dir.path().join("group/serde-rs_serde/SUMMARY.md"), b"# Serde");
        write(&dir.path().join("other_repo/README.md"), b"not a summary");

        let catalog = store.list_available();

        assert_eq!(
            catalog.keys().collect::<Vec<_>>(),
            vec!["serde-rs_serde", "tokio-rs_tokio"]
        );
        let tokio = catalog.get("tokio-rs_tokio").unwrap();
        assert_eq!(tokio.content, "# Tokio");
        assert_eq!(tokio.hash, digest_models::content_hash("# Tokio"));
    }

    #[test]
    fn test_skips_unreadable_summary() {
        let dir = tempdir().unwrap();
        let store = SummaryStore::new(dir.path());
        write(&store.summary_path("good_repo"), b"fine");
        write(&store.summary_path("bad_repo"), &[0xff, 0xfe, 0x00, 0xc3]);

        let catalog = store.list_available();

        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["good_repo"]);
    }

    #[test]
    fn test_duplicate_key_first_path_wins() {
        let dir = tempdir().unwrap();
        let store = SummaryStore::new(dir.path());
        write(&dir.path().join("a/dup_key/SUMMARY.md"), b"first");
        write(&dir.path().join("b/dup_key/SUMMARY.md"), b"second");

        let catalog = store.list_available();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("dup_key").unwrap().content, "first");
    }

    #[test]
    fn test_rescans_each_call() {
        let dir = tempdir().unwrap();
        let store = SummaryStore::new(dir.path());
        assert!(store.list_available().is_empty());

        write(&store.summary_path("late_arrival"), b"new");
        assert!(store.list_available().contains("late_arrival"));

        fs::remove_file(store.summary_path("late_arrival")).unwrap();
        assert!(store.list_available().is_empty());
    }
}
