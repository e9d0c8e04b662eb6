//! Per-directory recency list of committed search queries.

use super::error::CoreError;
use crate::config::SearchConfig;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const HISTORY_FILE: &str = "search_history.json";

/// Stores past search terms keyed by absolute directory path.
///
/// Each directory keeps its own most-recent-first list; lists are
/// deduplicated, capped, and fully independent of one another. Persistence
/// is best-effort: a failed save is logged and the in-memory state stays
/// authoritative.
#[derive(Debug)]
pub struct SearchHistory {
    terms: HashMap<String, Vec<String>>,
    cap: usize,
    min_term_length: usize,
    store_path: Option<PathBuf>,
}

impl SearchHistory {
    /// A store that never touches disk. Used by tests and by embedders that
    /// persist history themselves.
    pub fn in_memory(config: &SearchConfig) -> Self {
        Self {
            terms: HashMap::new(),
            cap: config.history_cap,
            min_term_length: config.history_min_term_length,
            store_path: None,
        }
    }

    /// Loads history from a JSON file, saving back to the same path on every
    /// change. A missing file starts empty; a corrupt file is logged and
    /// also starts empty rather than failing.
    pub fn load(path: PathBuf, config: &SearchConfig) -> Self {
        let terms = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(terms) => terms,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse search history at {:?}: {}. Starting empty.",
                        path,
                        e
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            terms,
            cap: config.history_cap,
            min_term_length: config.history_min_term_length,
            store_path: Some(path),
        }
    }

    /// The platform-specific default location of the history file.
    pub fn default_store_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "markview", "MarkView")
            .map(|dirs| dirs.data_dir().join(HISTORY_FILE))
    }

    /// Past terms for a directory, most recent first.
    pub fn terms_for(&self, directory_key: &str) -> Vec<String> {
        self.terms.get(directory_key).cloned().unwrap_or_default()
    }

    /// Records a committed term for a directory.
    ///
    /// The term is trimmed first; terms shorter than the configured minimum
    /// are dropped. Re-adding an existing term promotes it to the front.
    pub fn add(&mut self, term: &str, directory_key: &str) {
        let term = term.trim();
        if term.chars().count() < self.min_term_length {
            return;
        }

        let list = self.terms.entry(directory_key.to_string()).or_default();
        list.retain(|existing| existing != term);
        list.insert(0, term.to_string());
        list.truncate(self.cap);

        if let Err(e) = self.save() {
            tracing::warn!("Failed to persist search history: {}", e);
        }
    }

    fn save(&self) -> Result<(), CoreError> {
        let Some(path) = &self.store_path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| CoreError::Io(e, dir.to_path_buf()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.terms)?;
        fs::write(path, json).map_err(|e| CoreError::Io(e, path.clone()))
    }
}

/// Convenience constructor used by the application shell: history at the
/// default platform location, or in-memory if that cannot be determined.
pub fn open_default(config: &SearchConfig) -> SearchHistory {
    match SearchHistory::default_store_path() {
        Some(path) => SearchHistory::load(path, config),
        None => {
            tracing::warn!("Could not determine history directory; history will not persist");
            SearchHistory::in_memory(config)
        }
    }
}
