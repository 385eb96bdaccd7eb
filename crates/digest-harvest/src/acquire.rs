//! Repository acquisition: shallow clone, doc discovery, copy, and read.

use std::fs;
use std::path::{Path, PathBuf};

use digest_persistence::SUMMARY_FILE_NAME;
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::error::{HarvestError, Result};

/// Directory names never searched for docs.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "venv",
    ".venv",
    "__pycache__",
    ".github",
    "tests",
    "test",
    "dist",
    "build",
];

/// File extensions treated as documentation, compared case-insensitively.
pub const DOC_EXTENSIONS: &[&str] = &["md", "rst", "pdf", "docx"];

/// Character budget for the text handed to the summarizer.
pub const MAX_CONTENT_CHARS: usize = 200_000;

/// Clones `url` into `dest` with `git clone --depth 1`.
pub async fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    let clone_err = |reason: String| HarvestError::Clone {
        url: url.to_string(),
        reason,
    };

    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .output()
        .await
        .map_err(|e| clone_err(e.to_string()))?;

    if !output.status.success() {
        return Err(clone_err(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    debug!(url, dest = %dest.display(), "Cloned repository");
    Ok(())
}

/// Finds documentation files under `root`, sorted by path.
///
/// Paths with a component in [`SKIP_DIRS`] (relative to `root`) are ignored.
pub fn find_doc_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(root, &mut |path| {
        if is_doc_file(path) {
            files.push(path.to_path_buf());
        }
    });
    files.sort();
    files
}

/// Lists every file already copied into a docs directory, except the
/// summary itself.
pub fn existing_docs(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(dir, &mut |path| {
        if path.file_name().map_or(true, |n| n != SUMMARY_FILE_NAME) {
            files.push(path.to_path_buf());
        }
    });
    files.sort();
    files
}

/// Copies `files` from `repo_root` into `dest_dir`, keeping relative paths.
///
/// Failures are logged per file. Returns how many files were copied.
pub fn copy_docs(files: &[PathBuf], repo_root: &Path, dest_dir: &Path) -> usize {
    let mut copied = 0;
    for file in files {
        let Ok(relative) = file.strip_prefix(repo_root) else {
            warn!(path = %file.display(), "Doc file outside repository, skipping");
            continue;
        };
        let target = dest_dir.join(relative);

        let result = target
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::copy(file, &target));

        match result {
            Ok(_) => copied += 1,
            Err(e) => error!(path = %file.display(), error = %e, "Failed to copy doc file"),
        }
    }
    copied
}

/// Concatenates the files with a banner per file, as lossy UTF-8.
///
/// Output stops at `max_chars` characters.
pub fn read_docs_content(files: &[PathBuf], max_chars: usize) -> String {
    let banner = "=".repeat(80);
    let mut combined = String::new();
    let mut chars = 0;

    for file in files {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %file.display(), error = %e, "Failed to read doc file");
                continue;
            }
        };
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let section = format!(
            "\n\n{banner}\n FILE: {name}\n{banner}\n\n{}",
            String::from_utf8_lossy(&bytes)
        );

        let section_chars = section.chars().count();
        if chars + section_chars > max_chars {
            combined.extend(section.chars().take(max_chars - chars));
            warn!(limit = max_chars, "Doc content limit reached, truncating");
            break;
        }
        combined.push_str(&section);
        chars += section_chars;
    }

    combined
}

fn is_doc_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOC_EXTENSIONS
                .iter()
                .any(|doc| ext.eq_ignore_ascii_case(doc))
        })
        .unwrap_or(false)
}

fn walk(dir: &Path, visit: &mut dyn FnMut(&Path)) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            let skipped = entry
                .file_name()
                .to_str()
                .is_some_and(|name| SKIP_DIRS.contains(&name));
            if !skipped {
                walk(&path, visit);
            }
        } else if file_type.is_file() {
            visit(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_doc_files_filters_and_skips() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "README.md", "readme");
        touch(root, "docs/guide.RST", "guide");
        touch(root, "docs/manual.pdf", "pdf");
        touch(root, "src/main.rs", "code");
        touch(root, "node_modules/pkg/README.md", "dep");
        touch(root, "tests/fixtures/notes.md", "fixture");
        touch(root, ".github/ISSUE_TEMPLATE.md", "template");

        let files: Vec<PathBuf> = find_doc_files(root)
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("docs/guide.RST"),
                PathBuf::from("docs/manual.pdf"),
            ]
        );
    }

    #[test]
    fn test_skip_is_relative_to_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("build").join("repo");
        touch(&root, "README.md", "readme");

        assert_eq!(find_doc_files(&root).len(), 1);
    }

    #[test]
    fn test_copy_docs_keeps_layout() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("clone");
        let dest = dir.path().join("docs/owner_repo");
        touch(&repo, "README.md", "top");
        touch(&repo, "docs/a/b.md", "nested");

        let copied = copy_docs(&find_doc_files(&repo), &repo, &dest);

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dest.join("docs/a/b.md")).unwrap(), "nested");
        assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "top");
    }

    #[test]
    fn test_existing_docs_excludes_summary() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "README.md", "x");
        touch(dir.path(), "SUMMARY.md", "y");

        let files = existing_docs(dir.path());

        assert_eq!(files, vec![dir.path().join("README.md")]);
    }

    #[test]
    fn test_read_docs_content_banners() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.md", "alpha");
        fs::write(dir.path().join("b.pdf"), [0x25, 0x50, 0xff, 0x44]).unwrap();

        let content = read_docs_content(
            &[dir.path().join("a.md"), dir.path().join("b.pdf")],
            MAX_CONTENT_CHARS,
        );

        assert!(content.contains(" FILE: a.md\n"));
        assert!(content.contains("\n\nalpha"));
        assert!(content.contains(" FILE: b.pdf\n"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_docs_content_truncates() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.md", &"x".repeat(500));
        touch(dir.path(), "b.md", "never read");

        let content = read_docs_content(&[dir.path().join("a.md"), dir.path().join("b.md")], 300);

        assert_eq!(content.chars().count(), 300);
        assert!(!content.contains("b.md"));
    }

    #[tokio::test]
    async fn test_clone_failure_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-repo");

        let result = clone_repo(&missing.to_string_lossy(), &dir.path().join("out")).await;

        assert!(matches!(result, Err(HarvestError::Clone { .. })));
    }
}
