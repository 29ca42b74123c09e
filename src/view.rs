//! Render model derived from session state.
//!
//! [`ResultPanel`] decides what the result area shows. It is a pure function
//! of [`SessionState`]; the HTTP API ships it next to the raw state and the
//! CLI prints its [`Display`](std::fmt::Display) form.

use std::fmt;

use serde::Serialize;

use crate::analysis::{AnalysisResult, Clause, GrammarIssue, SentenceComponent};
use crate::controller::SessionState;

/// Grammar-check section of a finished analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "issues", rename_all = "snake_case")]
pub enum GrammarPanel {
    /// The model found nothing to correct.
    NoIssues,
    Issues(Vec<GrammarIssue>),
}

/// What the result area displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum ResultPanel {
    /// Nothing attempted yet this session.
    Welcome,
    Loading,
    Error { message: String },
    Ready {
        components: Vec<SentenceComponent>,
        clauses: Vec<Clause>,
        grammar: GrammarPanel,
    },
    /// Not loading, no error, no result, and past the initial state.
    ///
    /// The controller never leaves a session like this; only a hand-built
    /// [`SessionState`] renders as `Empty`.
    Empty,
}

impl ResultPanel {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        if state.is_loading {
            return Self::Loading;
        }
        if let Some(message) = &state.error {
            return Self::Error {
                message: message.clone(),
            };
        }
        match &state.result {
            Some(result) => Self::ready(result),
            None if state.is_initial_state => Self::Welcome,
            None => Self::Empty,
        }
    }

    fn ready(result: &AnalysisResult) -> Self {
        let grammar = if result.has_grammar_issues() {
            GrammarPanel::Issues(result.grammar_check.clone())
        } else {
            GrammarPanel::NoIssues
        };
        Self::Ready {
            components: result.components.clone(),
            clauses: result.clauses.clone(),
            grammar,
        }
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => writeln!(f, "Enter a sentence to see its structure."),
            Self::Loading => writeln!(f, "Analyzing..."),
            Self::Error { message } => writeln!(f, "Analysis failed: {message}"),
            Self::Empty => writeln!(f, "No result."),
            Self::Ready {
                components,
                clauses,
                grammar,
            } => {
                writeln!(f, "Components:")?;
                for c in components {
                    writeln!(f, "  [{}] {}", c.part, c.text)?;
                }

                writeln!(f, "Clauses:")?;
                if clauses.is_empty() {
                    writeln!(f, "  (none)")?;
                }
                for c in clauses {
                    writeln!(f, "  [{}] {}", c.kind, c.text)?;
                    writeln!(f, "      {}", c.explanation)?;
                }

                writeln!(f, "Grammar check:")?;
                match grammar {
                    GrammarPanel::NoIssues => writeln!(f, "  No grammar issues found."),
                    GrammarPanel::Issues(issues) => {
                        for i in issues {
                            writeln!(f, "  {} -> {}", i.original, i.correction)?;
                            writeln!(f, "      {}", i.explanation)?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result() -> AnalysisResult {
        AnalysisResult {
            components: vec![SentenceComponent {
                part: "主语".to_string(),
                text: "The cat".to_string(),
            }],
            clauses: vec![],
            grammar_check: vec![],
        }
    }

    #[test]
    fn test_no_issues_differs_from_no_result() {
        let mut state = SessionState {
            result: Some(empty_result()),
            is_initial_state: false,
            ..SessionState::default()
        };
        let with_result = ResultPanel::from_state(&state);
        assert!(matches!(
            with_result,
            ResultPanel::Ready {
                grammar: GrammarPanel::NoIssues,
                ..
            }
        ));
        assert!(with_result.to_string().contains("No grammar issues found."));

        state.result = None;
        let without = ResultPanel::from_state(&state);
        assert_eq!(without, ResultPanel::Empty);
        assert_ne!(with_result.to_string(), without.to_string());
    }

    #[test]
    fn test_panel_precedence() {
        assert_eq!(
            ResultPanel::from_state(&SessionState::default()),
            ResultPanel::Welcome
        );

        let loading = SessionState {
            is_loading: true,
            is_initial_state: false,
            ..SessionState::default()
        };
        assert_eq!(ResultPanel::from_state(&loading), ResultPanel::Loading);

        let failed = SessionState {
            error: Some("API Error: 500 boom".to_string()),
            is_initial_state: false,
            ..SessionState::default()
        };
        assert!(matches!(
            ResultPanel::from_state(&failed),
            ResultPanel::Error { message } if message.contains("boom")
        ));
    }

    #[test]
    fn test_issues_rendered() {
        let mut result = empty_result();
        result.grammar_check.push(GrammarIssue {
            original: "sat".to_string(),
            correction: "sits".to_string(),
            explanation: "时态".to_string(),
        });
        let state = SessionState {
            result: Some(result),
            is_initial_state: false,
            ..SessionState::default()
        };
        let panel = ResultPanel::from_state(&state);
        assert!(panel.to_string().contains("sat -> sits"));

        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["panel"], "ready");
        assert_eq!(json["grammar"]["status"], "issues");
    }
}
