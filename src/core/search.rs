//! Line-oriented content search across a scanned file set.

use super::error::CoreError;
use super::fuzzy::FuzzyMatcher;
use super::scanner::DirectoryScanner;
use super::{FileEntry, ScanFilter, SearchMode};
use crate::config::SearchConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A neighboring line captured around a match, tagged so the UI can render
/// match and context rows differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    pub line_number: usize,
    pub text: String,
    pub is_match: bool,
}

/// One matching line within a file. Line numbers are 1-based; text is
/// trimmed and length-capped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub line_number: usize,
    pub text: String,
    pub context_lines: Vec<ContextLine>,
}

/// All matches for a single file, ordered by ascending line number.
///
/// The serialized field names (`path`, `fileName`, `directory`, `matches`)
/// are consumed verbatim by the HTTP collaborator and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub path: String,
    pub file_name: String,
    pub directory: String,
    pub matches: Vec<SearchMatch>,
}

/// Searches file contents line by line, or delegates to the fuzzy filename
/// matcher, depending on the caller-selected mode.
pub struct ContentSearchEngine {
    config: SearchConfig,
}

impl ContentSearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Runs a search over `files`, invoking `on_progress` with the number of
    /// files completed so far as each file finishes.
    ///
    /// Unreadable files are skipped silently; files without matches are
    /// omitted; result order follows the input file order. This entry point
    /// is infallible.
    pub fn search<F>(
        &self,
        query: &str,
        files: &[FileEntry],
        mode: SearchMode,
        on_progress: F,
    ) -> Vec<SearchResult>
    where
        F: Fn(usize) + Send + Sync,
    {
        let never_cancelled = AtomicBool::new(false);
        self.run(query, files, mode, &never_cancelled, &on_progress)
            .unwrap_or_default()
    }

    /// Like [`search`](Self::search), but checks `cancel` between files and
    /// returns [`CoreError::Cancelled`] once it is set. Results for files
    /// completed before cancellation are discarded; partial state never
    /// leaks out.
    pub fn search_cancellable<F>(
        &self,
        query: &str,
        files: &[FileEntry],
        mode: SearchMode,
        cancel: &AtomicBool,
        on_progress: F,
    ) -> Result<Vec<SearchResult>, CoreError>
    where
        F: Fn(usize) + Send + Sync,
    {
        self.run(query, files, mode, cancel, &on_progress)
    }

    /// Scans `root` with `filter`, orders entries lexicographically by
    /// relative path, and searches them. This is the one-shot entry point
    /// used by stateless collaborators such as the HTTP API.
    pub fn search_directory<F>(
        &self,
        root: &Path,
        query: &str,
        mode: SearchMode,
        filter: ScanFilter,
        on_progress: F,
    ) -> Vec<SearchResult>
    where
        F: Fn(usize) + Send + Sync,
    {
        let mut entries = DirectoryScanner::scan(root, filter);
        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        self.search(query, &entries, mode, on_progress)
    }

    fn run<F>(
        &self,
        query: &str,
        files: &[FileEntry],
        mode: SearchMode,
        cancel: &AtomicBool,
        on_progress: &F,
    ) -> Result<Vec<SearchResult>, CoreError>
    where
        F: Fn(usize) + Send + Sync,
    {
        if mode == SearchMode::Filename {
            let results = FuzzyMatcher::search(query, files)
                .iter()
                .map(Self::entry_without_matches)
                .collect();
            return Ok(results);
        }

        // An empty content query matches every line of every file; treat it
        // as "no query" instead.
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let query = query.to_lowercase();
        let completed = AtomicUsize::new(0);

        let per_file: Vec<Option<SearchResult>> = files
            .par_iter()
            .map(|entry| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let result = self.scan_file(entry, &query);
                on_progress(completed.fetch_add(1, Ordering::Relaxed) + 1);
                result
            })
            .collect();

        if cancel.load(Ordering::Relaxed) {
            return Err(CoreError::Cancelled);
        }
        Ok(per_file.into_iter().flatten().collect())
    }

    /// Scans one file, honoring the per-file match cap. Returns `None` for
    /// unreadable or oversized files and for files without matches.
    fn scan_file(&self, entry: &FileEntry, query_lower: &str) -> Option<SearchResult> {
        if entry.size > self.config.max_search_file_size {
            tracing::debug!(
                "Skipping oversized file during content search: {}",
                entry.relative_path
            );
            return None;
        }

        let content = std::fs::read_to_string(&entry.absolute_path).ok()?;
        let lines: Vec<&str> = content.lines().collect();
        let mut matches = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if matches.len() >= self.config.max_matches_per_file {
                break;
            }
            if !line.to_lowercase().contains(query_lower) {
                continue;
            }

            let mut context_lines = Vec::new();
            let context_start = index.saturating_sub(self.config.context_lines);
            for context_index in context_start..index {
                context_lines.push(self.context_line(&lines, context_index));
            }
            let context_end = (index + self.config.context_lines).min(lines.len().saturating_sub(1));
            for context_index in (index + 1)..=context_end {
                context_lines.push(self.context_line(&lines, context_index));
            }

            matches.push(SearchMatch {
                line_number: index + 1,
                text: self.clip(line),
                context_lines,
            });
        }

        if matches.is_empty() {
            return None;
        }

        Some(SearchResult {
            path: entry.absolute_path.to_string_lossy().into_owned(),
            file_name: entry.name.clone(),
            directory: entry
                .absolute_path
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default(),
            matches,
        })
    }

    fn context_line(&self, lines: &[&str], index: usize) -> ContextLine {
        ContextLine {
            line_number: index + 1,
            text: self.clip(lines[index]),
            is_match: false,
        }
    }

    fn clip(&self, line: &str) -> String {
        line.trim().chars().take(self.config.line_text_cap).collect()
    }

    fn entry_without_matches(entry: &FileEntry) -> SearchResult {
        SearchResult {
            path: entry.absolute_path.to_string_lossy().into_owned(),
            file_name: entry.name.clone(),
            directory: entry
                .absolute_path
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default(),
            matches: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    fn entry_for(dir: &TempDir, relative: &str, content: &str) -> FileEntry {
        let absolute = dir.path().join(relative);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&absolute, content).unwrap();
        FileEntry {
            id: relative.to_string(),
            name: relative.rsplit('/').next().unwrap().to_string(),
            relative_path: relative.to_string(),
            absolute_path: absolute,
            size: content.len() as u64,
            modified: DateTime::<Utc>::UNIX_EPOCH,
            is_markdown: relative.ends_with(".md"),
        }
    }

    fn engine() -> ContentSearchEngine {
        ContentSearchEngine::new(SearchConfig::default())
    }

    #[test]
    fn match_carries_line_number_and_context() {
        let dir = TempDir::new().unwrap();
        let files = vec![entry_for(&dir, "a.md", "alpha\nneedle here\nomega\n")];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        assert_eq!(results.len(), 1);

        let matched = &results[0].matches[0];
        assert_eq!(matched.line_number, 2);
        assert_eq!(matched.text, "needle here");
        assert_eq!(matched.context_lines.len(), 2);
        assert_eq!(matched.context_lines[0].line_number, 1);
        assert_eq!(matched.context_lines[0].text, "alpha");
        assert!(!matched.context_lines[0].is_match);
        assert_eq!(matched.context_lines[1].line_number, 3);
        assert_eq!(matched.context_lines[1].text, "omega");
    }

    #[test]
    fn context_is_absent_at_file_boundaries() {
        let dir = TempDir::new().unwrap();
        let files = vec![entry_for(&dir, "a.md", "needle\n")];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        assert!(results[0].matches[0].context_lines.is_empty());
    }

    #[test]
    fn matches_per_file_are_capped() {
        let dir = TempDir::new().unwrap();
        let content = "needle\n".repeat(12);
        let files = vec![entry_for(&dir, "a.md", &content)];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        let matches = &results[0].matches;
        assert_eq!(matches.len(), SearchConfig::default().max_matches_per_file);

        // Ascending 1-based line numbers, stopping at the cap.
        let line_numbers: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
        assert_eq!(line_numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn long_lines_are_trimmed_and_clipped() {
        let dir = TempDir::new().unwrap();
        let config = SearchConfig {
            line_text_cap: 10,
            ..Default::default()
        };
        let files = vec![entry_for(&dir, "a.md", "   needle plus a very long tail   \n")];

        let results =
            ContentSearchEngine::new(config).search("needle", &files, SearchMode::Content, |_| {});
        assert_eq!(results[0].matches[0].text, "needle plu");
    }

    #[test]
    fn files_without_matches_are_omitted() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(&dir, "hit.md", "needle\n"),
            entry_for(&dir, "miss.md", "nothing to see\n"),
        ];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_name, "hit.md");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let files = vec![entry_for(&dir, "a.md", "The Needle\n")];

        let results = engine().search("nEEdle", &files, SearchMode::Content, |_| {});
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn unreadable_files_are_skipped_silently() {
        let dir = TempDir::new().unwrap();
        let missing = entry_for(&dir, "gone.md", "needle\n");
        fs::remove_file(&missing.absolute_path).unwrap();
        let files = vec![missing, entry_for(&dir, "here.md", "needle\n")];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_name, "here.md");
    }

    #[test]
    fn result_order_follows_input_order() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(&dir, "z.md", "needle\n"),
            entry_for(&dir, "a.md", "needle\n"),
            entry_for(&dir, "m.md", "needle\n"),
        ];

        let results = engine().search("needle", &files, SearchMode::Content, |_| {});
        let names: Vec<&str> = results.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["z.md", "a.md", "m.md"]);
    }

    #[test]
    fn progress_reports_every_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(&dir, "a.md", "needle\n"),
            entry_for(&dir, "b.md", "no\n"),
            entry_for(&dir, "c.md", "needle\n"),
        ];

        let seen = AtomicUsize::new(0);
        engine().search("needle", &files, SearchMode::Content, |completed| {
            seen.fetch_max(completed, Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn filename_mode_delegates_to_fuzzy_with_empty_matches() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(&dir, "readme.md", "needle\n"),
            entry_for(&dir, "other.md", "needle\n"),
        ];

        let results = engine().search("readme", &files, SearchMode::Filename, |_| {});
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_name, "readme.md");
        assert!(results[0].matches.is_empty());
    }

    #[test]
    fn cancelled_search_reports_cancelled() {
        let dir = TempDir::new().unwrap();
        let files = vec![entry_for(&dir, "a.md", "needle\n")];

        let cancel = AtomicBool::new(true);
        let result =
            engine().search_cancellable("needle", &files, SearchMode::Content, &cancel, |_| {});
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let config = SearchConfig {
            max_search_file_size: 4,
            ..Default::default()
        };
        let files = vec![entry_for(&dir, "big.md", "needle needle needle\n")];

        let results =
            ContentSearchEngine::new(config).search("needle", &files, SearchMode::Content, |_| {});
        assert!(results.is_empty());
    }

    #[test]
    fn search_result_json_shape_is_stable() {
        let result = SearchResult {
            path: "/proj/docs/guide.md".to_string(),
            file_name: "guide.md".to_string(),
            directory: "/proj/docs".to_string(),
            matches: vec![SearchMatch {
                line_number: 3,
                text: "hello world".to_string(),
                context_lines: vec![ContextLine {
                    line_number: 2,
                    text: "intro".to_string(),
                    is_match: false,
                }],
            }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": "/proj/docs/guide.md",
                "fileName": "guide.md",
                "directory": "/proj/docs",
                "matches": [{
                    "lineNumber": 3,
                    "text": "hello world",
                    "contextLines": [{
                        "lineNumber": 2,
                        "text": "intro",
                        "isMatch": false,
                    }],
                }],
            })
        );

        let round_tripped: SearchResult = serde_json::from_value(json).unwrap();
        assert_eq!(round_tripped, result);
    }
}
