//! Recursive directory traversal producing `FileEntry` records.

use super::gitignore::GitignoreMatcher;
use super::{FileEntry, ScanFilter};
use crate::utils::file_detection::{is_hidden_name, is_markdown_file};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into, regardless of gitignore contents.
const PRUNED_DIRS: &[&str] = &["node_modules", ".git"];

/// Build-artifact directories additionally pruned by the batched scan.
const BUILD_ARTIFACT_DIRS: &[&str] = &["target", "build", "dist", "DerivedData"];

/// Walks directory trees and materializes the files that survive filtering.
///
/// The scanner is stateless; each call reads the root's `.gitignore` afresh
/// and operates on its own snapshot, so concurrent scans never interact.
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Synchronous whole-tree scan.
    ///
    /// Returns surviving files in filesystem enumeration order; callers sort
    /// as needed. An unreadable or missing root yields an empty list rather
    /// than an error.
    pub fn scan(root: &Path, filter: ScanFilter) -> Vec<FileEntry> {
        let matcher = GitignoreMatcher::load(root);
        Self::iter_files(root, filter, &matcher, PRUNED_DIRS).collect()
    }

    /// Background streaming scan.
    ///
    /// Spawns a task that walks the tree and invokes `on_batch(entries,
    /// is_final)` with up to `batch_size` entries at a time, in discovery
    /// order. The terminal call always carries an empty batch and
    /// `is_final = true`, exactly once, after every data batch. There is no
    /// cancel primitive: a caller that loses interest simply stops reading,
    /// and the walk finishes on its own without touching shared state.
    pub fn scan_batched<F>(
        root: PathBuf,
        filter: ScanFilter,
        batch_size: usize,
        on_batch: F,
    ) -> JoinHandle<()>
    where
        F: Fn(Vec<FileEntry>, bool) + Send + 'static,
    {
        let batch_size = batch_size.max(1);

        tokio::spawn(async move {
            let matcher = GitignoreMatcher::load(&root);
            let mut pruned: Vec<&str> = PRUNED_DIRS.to_vec();
            pruned.extend_from_slice(BUILD_ARTIFACT_DIRS);

            let mut batch = Vec::with_capacity(batch_size);
            let mut delivered = 0usize;

            for entry in Self::iter_files(&root, filter, &matcher, &pruned) {
                batch.push(entry);
                if batch.len() >= batch_size {
                    delivered += batch.len();
                    on_batch(std::mem::take(&mut batch), false);
                    // Keep a shared runtime responsive during long walks.
                    tokio::task::yield_now().await;
                }
            }

            if !batch.is_empty() {
                delivered += batch.len();
                on_batch(std::mem::take(&mut batch), false);
            }

            tracing::info!(
                "Batched scan of {} complete: {} files delivered",
                root.display(),
                delivered
            );
            on_batch(Vec::new(), true);
        })
    }

    fn iter_files<'a>(
        root: &'a Path,
        filter: ScanFilter,
        matcher: &'a GitignoreMatcher,
        pruned_dirs: &'a [&str],
    ) -> impl Iterator<Item = FileEntry> + 'a {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| Self::should_keep(root, entry, matcher, pruned_dirs))
            .filter_map(Result::ok)
            .filter_map(move |entry| Self::materialize(root, &entry, filter))
    }

    /// Decides whether an entry is kept; returning `false` for a directory
    /// prunes its entire subtree.
    fn should_keep(
        root: &Path,
        entry: &DirEntry,
        matcher: &GitignoreMatcher,
        pruned_dirs: &[&str],
    ) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        if is_hidden_name(&name) {
            return false;
        }

        let is_dir = entry.file_type().is_dir();
        if is_dir && pruned_dirs.iter().any(|dir| *dir == name) {
            return false;
        }

        match relative_path_str(root, entry.path()) {
            Some(relative) => !matcher.is_ignored(&relative, is_dir),
            None => true,
        }
    }

    fn materialize(root: &Path, entry: &DirEntry, filter: ScanFilter) -> Option<FileEntry> {
        if !entry.file_type().is_file() {
            return None;
        }
        if !filter.accepts(entry.path()) {
            return None;
        }

        let relative = relative_path_str(root, entry.path())?;

        // Unreadable metadata degrades to defaults instead of dropping the file.
        let (size, modified) = match entry.metadata() {
            Ok(metadata) => {
                let modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::UNIX_EPOCH);
                (metadata.len(), modified)
            }
            Err(_) => (0, DateTime::UNIX_EPOCH),
        };

        Some(FileEntry {
            id: relative.clone(),
            name: entry.file_name().to_string_lossy().into_owned(),
            relative_path: relative,
            absolute_path: entry.path().to_path_buf(),
            size,
            modified,
            is_markdown: is_markdown_file(entry.path()),
        })
    }
}

/// Path below `root`, joined with `/` regardless of platform.
fn relative_path_str(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let joined = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
