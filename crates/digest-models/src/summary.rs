//! Summary items and the catalog of currently available summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Returns the hex MD5 digest of a summary's content.
///
/// Only used for change detection in the sent log, never for security.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// A generated documentation summary for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    /// Stable key derived from the repository (`owner_repo`).
    pub key: String,

    /// Raw markdown content.
    pub content: String,

    /// Digest of `content`.
    pub hash: String,

    /// When the summary file was last modified.
    pub modified_at: DateTime<Utc>,
}

impl SummaryItem {
    /// Creates a new item, computing the content hash.
    pub fn new(
        key: impl Into<String>,
        content: impl Into<String>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        Self {
            key: key.into(),
            hash: content_hash(&content),
            content,
            modified_at,
        }
    }

    /// Returns the `owner/repo` slug for this item.
    ///
    /// GitHub owners cannot contain underscores, so the first underscore of
    /// the key separates owner and repository name.
    pub fn repo_slug(&self) -> String {
        match self.key.split_once('_') {
            Some((owner, repo)) => format!("{}/{}", owner, repo),
            None => self.key.clone(),
        }
    }

    /// Returns the GitHub URL of the originating repository.
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.repo_slug())
    }
}

/// The set of summaries available in one invocation, keyed by item key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<String, SummaryItem>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an item, returning the previous item with the same key.
    pub fn insert(&mut self, item: SummaryItem) -> Option<SummaryItem> {
        self.items.insert(item.key.clone(), item)
    }

    pub fn get(&self, key: &str) -> Option<&SummaryItem> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Iterates over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Iterates over items in ascending key order.
    pub fn items(&self) -> impl Iterator<Item = &SummaryItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<SummaryItem> for Catalog {
    fn from_iter<I: IntoIterator<Item = SummaryItem>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_md5_hex() {
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_hash("hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_new_computes_hash() {
        let item = SummaryItem::new("rust-lang_rust", "hello", Utc::now());
        assert_eq!(item.hash, content_hash("hello"));
    }

    #[test]
    fn test_repo_slug_and_url() {
        let item = SummaryItem::new("tokio-rs_tokio_extras", "", Utc::now());
        assert_eq!(item.repo_slug(), "tokio-rs/tokio_extras");
        assert_eq!(item.repo_url(), "https://github.com/tokio-rs/tokio_extras");

        let bare = SummaryItem::new("standalone", "", Utc::now());
        assert_eq!(bare.repo_slug(), "standalone");
    }

    #[test]
    fn test_catalog_from_iter_replaces_duplicates() {
        let now = Utc::now();
        let catalog: Catalog = vec![
            SummaryItem::new("b", "one", now),
            SummaryItem::new("a", "two", now),
            SummaryItem::new("b", "three", now),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(catalog.get("b").unwrap().content, "three");
        assert!(catalog.contains("a"));
        assert!(!catalog.contains("c"));
    }
}
