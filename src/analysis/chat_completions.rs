//! OpenAI Chat Completions analyzer.
//!
//! Sends one non-streaming request to `<base_url>/chat/completions` in JSON
//! mode and validates the returned content before handing it out.

use serde_json::Value;

use super::prompt::{SYSTEM_INSTRUCTION, user_message};
use super::{AnalysisError, AnalysisResult, AnalysisSettings, Analyzer};

/// Analyzer backed by the Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsAnalyzer {
    http: reqwest::Client,
    settings: AnalysisSettings,
}

impl std::fmt::Debug for ChatCompletionsAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsAnalyzer")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsAnalyzer {
    /// Create a new analyzer with the given settings.
    #[must_use]
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Full endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, sentence: &str) -> Value {
        serde_json::json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": user_message(sentence) }
            ],
            "response_format": { "type": "json_object" },
            "temperature": self.settings.temperature
        })
    }
}

#[async_trait::async_trait]
impl Analyzer for ChatCompletionsAnalyzer {
    async fn analyze(&self, sentence: &str) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::Configuration("API key is not configured".to_string()))?;

        let url = self.endpoint();
        tracing::debug!(url = %url, model = %self.settings.model, "Sending analysis request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(sentence))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = service_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string()
            });
            tracing::warn!(status = status.as_u16(), message = %message, "Analysis service returned an error");
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.bytes().await?;
        let envelope = decode_envelope(&body)?;

        let content = extract_content(&envelope).ok_or(AnalysisError::EmptyResponse)?;
        parse_payload(content)
    }
}

/// Pull `error.message` out of an error body, if it has one.
fn service_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Decode a fully received success body as JSON.
fn decode_envelope(body: &[u8]) -> Result<Value, AnalysisError> {
    serde_json::from_slice(body)
        .map_err(|e| AnalysisError::MalformedResult(format!("invalid response envelope: {e}")))
}

/// The single textual payload of the first choice.
fn extract_content(envelope: &Value) -> Option<&str> {
    envelope
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Validate and decode an analysis payload.
///
/// The payload must be a JSON object holding the `components`, `clauses`
/// and `grammarCheck` arrays, each element carrying all of its string
/// fields. Unknown keys are ignored. Nothing is partially recovered.
pub fn parse_payload(content: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AnalysisError::MalformedResult(format!("invalid JSON: {e}")))?;

    if !value.is_object() {
        return Err(AnalysisError::MalformedResult(
            "payload is not a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::MalformedResult(e.to_string()))
}
