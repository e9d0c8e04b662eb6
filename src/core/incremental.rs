//! Debounced, cancellable driver for interactive content search.
//!
//! Each keystroke supersedes the previous one: the pending debounce timer is
//! dropped, the in-flight search is flagged cancelled and aborted, and a new
//! generation begins. Events from superseded generations are never
//! delivered.

use super::error::CoreError;
use super::history::SearchHistory;
use super::search::{ContentSearchEngine, SearchResult};
use super::{FileEntry, SearchMode};
use crate::config::SearchConfig;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Events delivered to the caller as an interactive search progresses.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// The debounce interval elapsed and the search is running.
    Started { generation: u64 },
    /// A file finished scanning; `files_completed` counts from 1.
    Progress { generation: u64, files_completed: usize },
    /// The search ran to completion.
    Completed {
        generation: u64,
        results: Vec<SearchResult>,
    },
    /// The query was too short to search; existing results should be
    /// discarded.
    Cleared,
}

/// Fire-and-forget event delivery back to the caller's thread of origin.
///
/// Implementations wrap whatever message channel the host provides (an event
/// loop proxy, an MPSC sender in tests) and must not block.
pub trait SearchEventSink: Send + Sync + Clone + 'static {
    fn send(&self, event: SearchEvent);
}

struct ActiveSearch {
    task: JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

/// Drives content searches for a type-ahead UI.
pub struct IncrementalSearch<S: SearchEventSink> {
    config: SearchConfig,
    engine: Arc<ContentSearchEngine>,
    sink: S,
    history: Arc<Mutex<SearchHistory>>,
    generation: Arc<AtomicU64>,
    active: Mutex<Option<ActiveSearch>>,
}

impl<S: SearchEventSink> IncrementalSearch<S> {
    pub fn new(config: SearchConfig, history: SearchHistory, sink: S) -> Self {
        Self {
            engine: Arc::new(ContentSearchEngine::new(config.clone())),
            config,
            sink,
            history: Arc::new(Mutex::new(history)),
            generation: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Reacts to an input change: waits out the debounce interval, then runs
    /// the search. A newer call supersedes this one at any point. On
    /// completion the query is committed to history under `directory_key`.
    pub fn set_query(&self, query: &str, files: Arc<Vec<FileEntry>>, directory_key: &str) {
        self.start(query, files, directory_key, true);
    }

    /// Explicit submit: skips the debounce delay and commits the query to
    /// history immediately.
    pub fn submit(&self, query: &str, files: Arc<Vec<FileEntry>>, directory_key: &str) {
        self.start(query, files, directory_key, false);
    }

    /// Shared access to the underlying history store, for prefilling the
    /// query suggestions of the searched directory.
    pub fn history(&self) -> Arc<Mutex<SearchHistory>> {
        self.history.clone()
    }

    fn start(&self, query: &str, files: Arc<Vec<FileEntry>>, directory_key: &str, debounced: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_active();

        let query = query.trim().to_string();
        if query.chars().count() < self.config.min_query_length {
            self.sink.send(SearchEvent::Cleared);
            return;
        }

        if !debounced {
            self.history.lock().unwrap().add(&query, directory_key);
        }

        let delay = if debounced {
            Duration::from_millis(self.config.debounce_ms)
        } else {
            Duration::ZERO
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let task_cancel = cancel.clone();
        let engine = self.engine.clone();
        let sink = self.sink.clone();
        let history = self.history.clone();
        let current_generation = self.generation.clone();
        let directory_key = directory_key.to_string();

        let task = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if task_cancel.load(Ordering::Relaxed)
                || current_generation.load(Ordering::SeqCst) != generation
            {
                return;
            }

            sink.send(SearchEvent::Started { generation });

            let outcome = run_search(
                engine,
                sink.clone(),
                generation,
                query.clone(),
                files,
                task_cancel.clone(),
            )
            .await;

            match outcome {
                Ok(results) => {
                    if task_cancel.load(Ordering::Relaxed)
                        || current_generation.load(Ordering::SeqCst) != generation
                    {
                        return;
                    }
                    if debounced {
                        history.lock().unwrap().add(&query, &directory_key);
                    }
                    sink.send(SearchEvent::Completed {
                        generation,
                        results,
                    });
                }
                Err(CoreError::Cancelled) => {}
                Err(e) => tracing::warn!("Interactive content search failed: {}", e),
            }
        });

        *self.active.lock().unwrap() = Some(ActiveSearch { task, cancel });
    }

    fn cancel_active(&self) {
        if let Some(active) = self.active.lock().unwrap().take() {
            active.cancel.store(true, Ordering::SeqCst);
            active.task.abort();
        }
    }
}

impl<S: SearchEventSink> Drop for IncrementalSearch<S> {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

/// Runs the blocking line scan off the async runtime. Progress events are
/// suppressed once the generation has been cancelled.
async fn run_search<S: SearchEventSink>(
    engine: Arc<ContentSearchEngine>,
    sink: S,
    generation: u64,
    query: String,
    files: Arc<Vec<FileEntry>>,
    cancel: Arc<AtomicBool>,
) -> Result<Vec<SearchResult>, CoreError> {
    let progress_cancel = cancel.clone();
    tokio::task::spawn_blocking(move || {
        engine.search_cancellable(
            &query,
            &files,
            SearchMode::Content,
            &cancel,
            move |files_completed| {
                if !progress_cancel.load(Ordering::Relaxed) {
                    sink.send(SearchEvent::Progress {
                        generation,
                        files_completed,
                    });
                }
            },
        )
    })
    .await
    .map_err(CoreError::Join)?
}
