//! OpenAI chat completions backend
//!
//! API documentation: https://platform.openai.com/docs/api-reference/chat

use crate::constants::api::OPENAI_CHAT_URL;
use crate::error::{Error, Result};
use crate::llm::LlmBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// OpenAI backend
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Successful response
///
/// Example: `{"choices": [{"message": {"role": "assistant", "content": "..."}}]}`
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error body: `{"error": {"message": "...", "type": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn answer_from(response: ChatResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Llm("Model returned no answer".to_string()))
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system: &str, question: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
        };

        debug!("Asking {} ({} chars of system prompt)", self.model, system.len());

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::Llm(format!("OpenAI returned {}: {}", status, message)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        Self::answer_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "When does the yatra start?" },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_answer_from_response() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": " Morgaon is first. "}}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAiBackend::answer_from(response).unwrap(), "Morgaon is first.");
    }

    #[test]
    fn test_answer_from_empty_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(OpenAiBackend::answer_from(response), Err(Error::Llm(_))));
    }

    #[test]
    fn test_error_body() {
        let err: ErrorResponse =
            serde_json::from_str(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#)
                .unwrap();
        assert!(err.error.message.starts_with("Incorrect API key"));
    }

    #[tokio::test]
    #[ignore = "Requires network access and OPENAI_API_KEY"]
    async fn test_complete_live() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let backend = OpenAiBackend::new(&key, "gpt-4o-mini", 30).unwrap();
        let answer = backend.complete("Answer briefly.", "Say hi").await.unwrap();
        assert!(!answer.is_empty());
    }
}
