//! Structured analysis returned by the model.

use serde::{Deserialize, Serialize};

/// One grammatical role and the span of the sentence that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceComponent {
    /// Role label as supplied by the model (e.g., `主语`).
    pub part: String,
    /// The text segment.
    pub text: String,
}

/// A clause found in the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Clause category (e.g., `定语从句`).
    #[serde(rename = "type")]
    pub kind: String,
    /// The clause span.
    pub text: String,
    /// Prose explanation.
    pub explanation: String,
}

/// A grammar problem together with its fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub original: String,
    pub correction: String,
    pub explanation: String,
}

/// Complete analysis of one sentence.
///
/// All three collections are required on the wire. An empty
/// `grammar_check` means the model found no issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub components: Vec<SentenceComponent>,
    pub clauses: Vec<Clause>,
    pub grammar_check: Vec<GrammarIssue>,
}

impl AnalysisResult {
    /// Whether the grammar check reported at least one issue.
    #[must_use]
    pub fn has_grammar_issues(&self) -> bool {
        !self.grammar_check.is_empty()
    }
}
