//! Application state controller.
//!
//! The [`Controller`] owns the session state, the history list and the theme
//! preference. Every user intent goes through one of its methods; renderers
//! only ever see [`SessionSnapshot`]s.
//!
//! # Overlapping requests
//!
//! Each [`Controller::request_analysis`] call takes the next sequence
//! number. When the analysis finishes, its outcome is applied only if no
//! newer request was issued in the meantime; otherwise it is dropped and
//! the call reports [`AnalysisOutcome::Superseded`]. Loading stays on until
//! the newest request completes.
//!
//! The analyzer call and the state update after it run on a spawned task.
//! A caller that stops waiting (a dropped HTTP connection, say) does not
//! leave the controller stuck in loading.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sentence_flow::controller::Controller;
//! use sentence_flow::storage::MemoryStore;
//!
//! let controller = Controller::load(analyzer, Arc::new(MemoryStore::new())).await;
//! controller.set_sentence_text("The cat sat.").await;
//! controller.request_analysis(None).await;
//! assert_eq!(controller.snapshot().await.history.len(), 1);
//! ```

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::history::{History, HistoryEntry};
use crate::storage::{HISTORY_KEY, KeyValueStore, PersistenceError, THEME_KEY};

/// Built-in example sentences used by [`Controller::pick_random_sample`].
pub const SAMPLE_SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "Despite the heavy rain, the dedicated team continued their work on the project.",
    "What she wrote was a masterpiece, which everyone admired.",
    "To be or not to be, that is the question.",
    "I have a dream that one day this nation will rise up and live out the true meaning of its creed.",
];

/// Session error shown when an analysis task ends without an outcome.
const ANALYSIS_ABORTED: &str = "Analysis was interrupted. Please try again.";

/// What the interface currently shows.
///
/// In steady state at most one of `is_loading`, `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub sentence: String,
    pub result: Option<AnalysisResult>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// True until the first analysis attempt or history selection.
    pub is_initial_state: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            sentence: String::new(),
            result: None,
            is_loading: false,
            error: None,
            is_initial_state: true,
        }
    }
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Immutable copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub history: History,
    pub theme: Theme,
}

/// How a [`Controller::request_analysis`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The effective sentence was blank; nothing happened.
    Skipped,
    /// Another analysis was in flight and the intent does not overlap.
    Busy,
    /// The analysis succeeded and was applied.
    Completed(AnalysisResult),
    /// The analysis failed; the message is now the session error.
    Failed(String),
    /// A newer request was issued before this one finished; discarded.
    Superseded,
}

/// Result of selecting a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Applied,
    Busy,
    NotFound,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    history: History,
    theme: Theme,
    /// Sequence number of the newest issued analysis request.
    latest_request: u64,
}

/// Start loading for `sentence` and hand out its sequence number.
///
/// Returns `None` for blank input, leaving the state untouched.
fn begin_analysis(inner: &mut Inner, sentence: &str) -> Option<u64> {
    if sentence.trim().is_empty() {
        return None;
    }
    inner.latest_request += 1;
    inner.state.is_loading = true;
    inner.state.error = None;
    inner.state.result = None;
    inner.state.is_initial_state = false;
    Some(inner.latest_request)
}

/// State reachable from both the controller and its analysis tasks.
struct Shared {
    analyzer: Arc<dyn Analyzer>,
    store: Arc<dyn KeyValueStore>,
    inner: RwLock<Inner>,
    /// Serializes writes so the last one always carries the newest state.
    persist_lock: Mutex<()>,
}

/// Single owner of session and persisted state.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("store", &self.shared.store)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Create a controller and load persisted history and theme.
    ///
    /// Unreadable or corrupt records are discarded and the controller starts
    /// from empty defaults.
    pub async fn load(analyzer: Arc<dyn Analyzer>, store: Arc<dyn KeyValueStore>) -> Self {
        let history: History = load_record(store.as_ref(), HISTORY_KEY)
            .await
            .unwrap_or_default();
        let theme: Theme = load_record(store.as_ref(), THEME_KEY)
            .await
            .unwrap_or_default();

        tracing::info!(
            name: "controller.loaded",
            history_len = history.len(),
            theme = ?theme,
            "State loaded"
        );

        Self {
            shared: Arc::new(Shared {
                analyzer,
                store,
                inner: RwLock::new(Inner {
                    history,
                    theme,
                    ..Inner::default()
                }),
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Copy of the current state, history and theme.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.inner.read().await;
        SessionSnapshot {
            state: inner.state.clone(),
            history: inner.history.clone(),
            theme: inner.theme,
        }
    }

    /// Replace the current sentence text. No validation.
    pub async fn set_sentence_text(&self, sentence: impl Into<String>) {
        self.shared.inner.write().await.state.sentence = sentence.into();
    }

    /// Analyze `sentence_override`, or the current sentence when `None`.
    ///
    /// Blank input (after trimming) is a silent no-op. On success the result
    /// is shown and, if the sentence is new, added to the front of history.
    /// On failure the error message is shown and no result is kept.
    ///
    /// Dropping the returned future does not cancel the analysis; it still
    /// completes and clears the loading state.
    pub async fn request_analysis(&self, sentence_override: Option<&str>) -> AnalysisOutcome {
        let (seq, sentence) = {
            let mut inner = self.shared.inner.write().await;
            let sentence = sentence_override.map_or_else(|| inner.state.sentence.clone(), ToString::to_string);
            let Some(seq) = begin_analysis(&mut inner, &sentence) else {
                return AnalysisOutcome::Skipped;
            };
            (seq, sentence)
        };

        tracing::info!(name: "analysis.requested", seq, sentence = %sentence, "Analysis requested");
        self.spawn_analysis(seq, sentence).await
    }

    /// Pick a built-in sample sentence, make it current and analyze it.
    ///
    /// No-op while an analysis is in flight.
    pub async fn pick_random_sample(&self) -> AnalysisOutcome {
        let sample = {
            let mut rng = rand::thread_rng();
            SAMPLE_SENTENCES.choose(&mut rng).copied()
        };
        let Some(sample) = sample else {
            return AnalysisOutcome::Skipped;
        };

        let seq = {
            let mut inner = self.shared.inner.write().await;
            if inner.state.is_loading {
                return AnalysisOutcome::Busy;
            }
            inner.state.sentence = sample.to_string();
            let Some(seq) = begin_analysis(&mut inner, sample) else {
                return AnalysisOutcome::Skipped;
            };
            seq
        };

        tracing::info!(name: "analysis.requested", seq, sentence = %sample, "Sample analysis requested");
        self.spawn_analysis(seq, sample.to_string()).await
    }

    /// Run the analysis on its own task and wait for it.
    async fn spawn_analysis(&self, seq: u64, sentence: String) -> AnalysisOutcome {
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move { shared.run_analysis(seq, sentence).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(name: "analysis.task.failed", seq, error = %e, "Analysis task did not finish");
                self.shared.abandon(seq).await
            }
        }
    }

    /// Show a history entry without calling the analyzer.
    ///
    /// Returns `false` (and changes nothing) while loading.
    pub async fn select_entry(&self, entry: &HistoryEntry) -> bool {
        let mut inner = self.shared.inner.write().await;
        if inner.state.is_loading {
            return false;
        }
        inner.state.sentence = entry.sentence.clone();
        inner.state.result = Some(entry.result.clone());
        inner.state.error = None;
        inner.state.is_initial_state = false;
        true
    }

    /// Look up a history entry by id and show it.
    pub async fn select_history_entry(&self, id: &str) -> Selection {
        let entry = self.shared.inner.read().await.history.get(id).cloned();
        match entry {
            None => Selection::NotFound,
            Some(entry) if self.select_entry(&entry).await => Selection::Applied,
            Some(_) => Selection::Busy,
        }
    }

    /// Remove a history entry. Returns whether it existed.
    pub async fn remove_history_entry(&self, id: &str) -> bool {
        let removed = self.shared.inner.write().await.history.remove(id);
        if removed {
            tracing::debug!(name: "history.removed", id = %id, "History entry removed");
            self.shared.persist_history().await;
        }
        removed
    }

    /// Empty the history.
    pub async fn clear_history(&self) {
        self.shared.inner.write().await.history.clear();
        tracing::debug!(name: "history.cleared", "History cleared");
        self.shared.persist_history().await;
    }

    /// Flip the theme and persist it. Returns the new theme.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut inner = self.shared.inner.write().await;
            inner.theme = inner.theme.toggled();
            inner.theme
        };
        self.shared.persist_theme().await;
        theme
    }

    /// Write history and theme out. Called on shutdown.
    pub async fn flush(&self) {
        self.shared.persist_history().await;
        self.shared.persist_theme().await;
    }
}

impl Shared {
    async fn run_analysis(&self, seq: u64, sentence: String) -> AnalysisOutcome {
        let outcome = self.analyzer.analyze(&sentence).await;

        let mut inner = self.inner.write().await;
        if inner.latest_request != seq {
            tracing::debug!(
                name: "analysis.superseded",
                seq,
                latest = inner.latest_request,
                "Discarding stale analysis"
            );
            return AnalysisOutcome::Superseded;
        }
        inner.state.is_loading = false;

        match outcome {
            Ok(result) => {
                inner.state.result = Some(result.clone());
                let inserted = inner
                    .history
                    .insert_if_new(&sentence, result.clone())
                    .is_some();
                drop(inner);

                tracing::info!(
                    name: "analysis.completed",
                    seq,
                    components = result.components.len(),
                    clauses = result.clauses.len(),
                    grammar_issues = result.grammar_check.len(),
                    new_history_entry = inserted,
                    "Analysis completed"
                );
                if inserted {
                    self.persist_history().await;
                }
                AnalysisOutcome::Completed(result)
            }
            Err(e) => {
                let message = e.to_string();
                inner.state.error = Some(message.clone());
                drop(inner);

                tracing::warn!(
                    name: "analysis.failed",
                    seq,
                    kind = e.kind(),
                    error = %message,
                    "Analysis failed"
                );
                AnalysisOutcome::Failed(message)
            }
        }
    }

    /// Settle request `seq` after its task died without an outcome.
    async fn abandon(&self, seq: u64) -> AnalysisOutcome {
        let mut inner = self.inner.write().await;
        if inner.latest_request != seq {
            return AnalysisOutcome::Superseded;
        }
        let message = ANALYSIS_ABORTED.to_string();
        inner.state.is_loading = false;
        inner.state.error = Some(message.clone());
        AnalysisOutcome::Failed(message)
    }

    async fn persist_history(&self) {
        self.persist(HISTORY_KEY, |inner| serde_json::to_string(&inner.history))
            .await;
    }

    async fn persist_theme(&self) {
        self.persist(THEME_KEY, |inner| serde_json::to_string(&inner.theme))
            .await;
    }

    /// Encode the current state under the write lock and overwrite `key`.
    ///
    /// Failures are logged; in-memory state stays authoritative.
    async fn persist<F>(&self, key: &str, encode: F)
    where
        F: FnOnce(&Inner) -> serde_json::Result<String>,
    {
        let _guard = self.persist_lock.lock().await;
        let encoded = encode(&*self.inner.read().await).map_err(PersistenceError::from);
        let written = match encoded {
            Ok(value) => self.store.put(key, &value).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::error!(name: "storage.persist.failed", key = %key, error = %e, "Failed to persist record");
        }
    }
}

/// Read and decode a record, discarding it when it is corrupt.
async fn load_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(name: "storage.load.failed", key = %key, error = %e, "Failed to read record");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(name: "storage.load.corrupt", key = %key, error = %e, "Discarding corrupt record");
            if let Err(e) = store.remove(key).await {
                tracing::warn!(key = %key, error = %e, "Failed to remove corrupt record");
            }
            None
        }
    }
}
