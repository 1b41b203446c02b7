//! Lazy recursive file listing.
//!
//! [`FileWalker`] yields regular files one at a time as `walkdir` discovers
//! them, so callers can stream arbitrarily large trees. Traversal order is
//! whatever the filesystem returns.

use crate::error::{DocmatchError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// Walk options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkConfig {
    /// Follow symlinked directories and files
    pub follow_symlinks: bool,
    /// Include entries whose name starts with '.'
    pub include_hidden: bool,
    /// Directory names to prune (matched against the name, not the path)
    pub exclude_dir_names: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            exclude_dir_names: Vec::new(),
        }
    }
}

/// Iterator over the regular files below a root directory.
pub struct FileWalker {
    root: PathBuf,
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
    files: u64,
    errors: u64,
    finished: bool,
}

impl std::fmt::Debug for FileWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWalker")
            .field("root", &self.root)
            .field("files", &self.files)
            .field("errors", &self.errors)
            .finish()
    }
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>, config: &WalkConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(DocmatchError::FileNotFound(root));
        }
        if !root.is_dir() {
            return Err(DocmatchError::Config(format!(
                "scan root is not a directory: {}",
                root.display()
            )));
        }

        info!(root = %root.display(), "Starting directory scan");

        let include_hidden = config.include_hidden;
        let excluded = config.exclude_dir_names.clone();
        let entries = WalkDir::new(&root)
            .follow_links(config.follow_symlinks)
            .min_depth(1)
            .into_iter()
            .filter_entry(move |entry| keep_entry(entry, include_hidden, &excluded));

        Ok(Self {
            root,
            entries: Box::new(entries),
            files: 0,
            errors: 0,
            finished: false,
        })
    }

    /// Files yielded so far
    pub fn files_found(&self) -> u64 {
        self.files
    }

    /// Entries that could not be read (logged and skipped)
    pub fn errors(&self) -> u64 {
        self.errors
    }
}

impl Iterator for FileWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if self.finished {
            return None;
        }
        for entry in self.entries.by_ref() {
            match entry {
                Ok(entry) if entry.file_type().is_file() || is_linked_file(&entry) => {
                    self.files += 1;
                    return Some(entry.into_path());
                }
                Ok(_) => continue,
                Err(err) => {
                    self.errors += 1;
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(path = %path, error = %err, "Skipping unreadable entry");
                }
            }
        }

        self.finished = true;
        info!(
            root = %self.root.display(),
            files = self.files,
            errors = self.errors,
            "Completed directory scan"
        );
        None
    }
}

/// A symlink that resolves to a regular file. Only reached when links are not
/// followed; symlinked directories are still not descended into.
fn is_linked_file(entry: &DirEntry) -> bool {
    entry.path_is_symlink()
        && std::fs::metadata(entry.path())
            .map(|meta| meta.is_file())
            .unwrap_or(false)
}

fn keep_entry(entry: &DirEntry, include_hidden: bool, excluded: &[String]) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if !include_hidden && name.starts_with('.') {
        return false;
    }
    if entry.file_type().is_dir() && excluded.iter().any(|ex| *ex == name) {
        return false;
    }
    true
}

/// Every regular file under `root` with default options.
pub fn list_files(root: impl AsRef<Path>) -> Result<FileWalker> {
    FileWalker::new(root, &WalkConfig::default())
}
