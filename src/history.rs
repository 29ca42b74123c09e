//! History of completed analyses, most recent first.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// A cached analysis keyed by the sentence it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, time-derived identifier.
    pub id: String,
    pub sentence: String,
    pub result: AnalysisResult,
}

/// Ordered history list.
///
/// Sentences are unique at insertion time (exact, case-sensitive match).
/// Entries loaded from storage are taken as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains_sentence(&self, sentence: &str) -> bool {
        self.entries.iter().any(|e| e.sentence == sentence)
    }

    /// Insert a new entry at the front unless `sentence` is already present.
    ///
    /// Returns the inserted entry, or `None` when it was a duplicate.
    pub fn insert_if_new(
        &mut self,
        sentence: &str,
        result: AnalysisResult,
    ) -> Option<&HistoryEntry> {
        if self.contains_sentence(sentence) {
            return None;
        }
        let entry = HistoryEntry {
            id: self.next_id(),
            sentence: sentence.to_string(),
            result,
        };
        self.entries.insert(0, entry);
        self.entries.first()
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Millisecond timestamp, bumped past any id already in use.
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}
