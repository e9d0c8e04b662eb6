pub mod error;
pub mod fuzzy;
pub mod gitignore;
pub mod history;
pub mod incremental;
pub mod scanner;
pub mod search;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::file_detection::is_markdown_file;

/// A single file discovered during a scan.
///
/// Entries are immutable once produced and are superseded wholesale by the
/// next scan. `id` doubles as the stable key for UI lists and always equals
/// `relative_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size: u64,
    #[serde(rename = "modifiedDate")]
    pub modified: DateTime<Utc>,
    pub is_markdown: bool,
}

/// Which files a scan (and by extension a search) considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanFilter {
    MarkdownOnly,
    AllFiles,
}

impl ScanFilter {
    pub fn accepts(self, path: &Path) -> bool {
        match self {
            ScanFilter::AllFiles => true,
            ScanFilter::MarkdownOnly => is_markdown_file(path),
        }
    }
}

/// How a search interprets its query: against filenames (quick open) or
/// against file contents. Mode selection belongs to the caller, not the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Filename,
    Content,
}

pub use error::CoreError;
pub use fuzzy::FuzzyMatcher;
pub use gitignore::GitignoreMatcher;
pub use history::SearchHistory;
pub use incremental::{IncrementalSearch, SearchEvent, SearchEventSink};
pub use scanner::DirectoryScanner;
pub use search::{ContentSearchEngine, ContextLine, SearchMatch, SearchResult};
