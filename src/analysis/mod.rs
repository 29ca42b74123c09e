//! Sentence analysis client.
//!
//! This module talks to an OpenAI-compatible Chat Completions endpoint and
//! turns its structured JSON answer into an [`AnalysisResult`].
//!
//! # Overview
//!
//! The [`Analyzer`] trait is the seam the
//! [`Controller`](crate::controller::Controller) depends on. The production
//! implementation is [`ChatCompletionsAnalyzer`]; tests substitute their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use sentence_flow::analysis::{AnalysisSettings, Analyzer, ChatCompletionsAnalyzer};
//!
//! let settings = AnalysisSettings {
//!     base_url: "https://api.openai.com/v1".to_string(),
//!     api_key: Some("sk-...".to_string()),
//!     model: "gpt-4o-mini".to_string(),
//!     temperature: 0.3,
//! };
//! let analyzer = ChatCompletionsAnalyzer::new(settings);
//! let result = analyzer.analyze("The cat sat.").await?;
//! ```

pub mod chat_completions;
pub mod prompt;
mod types;

pub use chat_completions::{ChatCompletionsAnalyzer, parse_payload};
pub use types::{AnalysisResult, Clause, GrammarIssue, SentenceComponent};

use thiserror::Error;

/// Connection and model settings for the analysis service.
#[derive(Clone)]
pub struct AnalysisSettings {
    /// Base URL of the API, including any version prefix
    /// (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// Bearer secret. `None` makes every call fail with
    /// [`AnalysisError::Configuration`].
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
}

impl std::fmt::Debug for AnalysisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Failure of a single analysis call.
///
/// Every variant renders to one human-readable message, which is what the
/// controller shows to the user.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required setting (the API key) is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service answered with a non-success status.
    #[error("API Error: {status} {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message from the service body, or the status reason phrase.
        message: String,
    },

    /// The service answered but carried no textual payload.
    #[error("Empty response from AI")]
    EmptyResponse,

    /// The payload was not valid JSON or did not have the expected shape.
    #[error("Malformed analysis result: {0}")]
    MalformedResult(String),

    /// No response arrived at all (connection, DNS, TLS).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AnalysisError {
    /// Stable label for logs and assertions.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Service { .. } => "service",
            Self::EmptyResponse => "empty_response",
            Self::MalformedResult(_) => "malformed_result",
            Self::Transport(_) => "transport",
        }
    }
}

/// Something that can analyze one English sentence.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze `sentence`.
    ///
    /// The caller rejects blank input before calling; implementations do not
    /// re-validate it.
    async fn analyze(&self, sentence: &str) -> Result<AnalysisResult, AnalysisError>;
}
