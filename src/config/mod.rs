//! Tunable constants for scanning and search.
//!
//! Every component takes a `SearchConfig` through its constructor instead of
//! reading ambient globals, so callers (and tests) can vary the timings and
//! caps per instance.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet interval before an interactive query is executed.
    pub debounce_ms: u64,
    /// Interactive queries shorter than this clear results instead of searching.
    pub min_query_length: usize,
    /// Per-file cap on recorded matches; line scanning stops once reached.
    pub max_matches_per_file: usize,
    /// Context lines captured on each side of a matching line.
    pub context_lines: usize,
    /// Match and context text is trimmed, then clipped to this many characters.
    pub line_text_cap: usize,
    /// Entries per batch in the streaming scan.
    pub scan_batch_size: usize,
    /// Files larger than this many bytes are skipped by content search.
    pub max_search_file_size: u64,
    /// Per-directory cap on stored history terms.
    pub history_cap: usize,
    /// History terms shorter than this are not recorded.
    pub history_min_term_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_length: 2,
            max_matches_per_file: 5,
            context_lines: 1,
            line_text_cap: 200,
            scan_batch_size: 100,
            max_search_file_size: 10 * 1024 * 1024,
            history_cap: 20,
            history_min_term_length: 2,
        }
    }
}

impl SearchConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed is
    /// logged and also falls back to the defaults, so a corrupt config never
    /// prevents the application from starting.
    pub fn load_or_default(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config file at {:?}: {}. Falling back to default config.",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    /// Saves the configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
