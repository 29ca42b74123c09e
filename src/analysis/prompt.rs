//! Prompt text sent to the model.

/// System message. Pins the output to a JSON object.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that outputs JSON.";

/// Build the user message asking for an analysis of `sentence`.
///
/// The message fixes the JSON shape, requires Chinese descriptions, and
/// asks for an empty `grammarCheck` array when nothing is wrong.
#[must_use]
pub fn user_message(sentence: &str) -> String {
    format!(
        r#"You are an expert English syntactic analysis tool designed for Chinese learners. Analyze the user's sentence and provide a detailed breakdown in JSON format.

Strictly adhere to this JSON structure:
{{
  "components": [
    {{ "part": "Grammar part in Chinese (e.g. 主语, 谓语)", "text": "The text segment" }}
  ],
  "clauses": [
    {{ "type": "Clause type in Chinese (e.g. 定语从句)", "text": "The clause text", "explanation": "Brief explanation in Chinese" }}
  ],
  "grammarCheck": [
    {{ "original": "Error text", "correction": "Corrected text", "explanation": "Why it is wrong in Chinese" }}
  ]
}}

Rules:
1. Descriptions must be in Chinese.
2. If no grammar errors are found, "grammarCheck" must be an empty array [].
3. Be precise with linguistic terminology.

User Input: "{sentence}""#
    )
}
