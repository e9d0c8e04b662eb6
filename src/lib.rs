//! Project file-search and content-indexing core for the MarkView markdown
//! viewer.
//!
//! The crate exposes a gitignore-aware directory scanner, a fuzzy filename
//! matcher for quick-open lookup, a line-oriented content search engine with
//! a debounced interactive driver, and a per-directory search history store.
//! Rendering, windowing, and transport concerns live in the surrounding
//! application and call into this crate with plain request/response values.

pub mod config;
pub mod core;
pub mod utils;

pub use config::SearchConfig;
pub use core::{
    ContentSearchEngine, ContextLine, CoreError, DirectoryScanner, FileEntry, FuzzyMatcher,
    GitignoreMatcher, IncrementalSearch, ScanFilter, SearchEvent, SearchEventSink, SearchHistory,
    SearchMatch, SearchMode, SearchResult,
};
