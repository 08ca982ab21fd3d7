//! Generative advisor adapter for the chat-completions capability.
//!
//! Exactly one request per run, a fixed two-message exchange, and no internal
//! retry loop: a rate-limit response surfaces as `AdvisorError::RateLimited`
//! so the caller can decide whether to try again later, distinct from every
//! other failure kind.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AdvisorCredentials;

pub mod prompts;

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by the chat capability")]
    RateLimited,

    #[error("chat capability returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the first choice's content; empty content counts as missing.
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()?
            .message
            .content
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Produces free-text career advice for a canonical input.
#[async_trait]
pub trait CareerAdvisor: Send + Sync {
    async fn suggest_careers(&self, input: &str) -> Result<String, AdvisorError>;
}

/// Chat-completions client with the career-advisor persona.
#[derive(Clone)]
pub struct AdvisorClient {
    client: Client,
    endpoint: String,
    key: String,
    deployment: String,
    api_version: String,
}

impl AdvisorClient {
    pub fn new(credentials: AdvisorCredentials) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: credentials.endpoint,
            key: credentials.key,
            deployment: credentials.deployment,
            api_version: credentials.api_version,
        }
    }
}

#[async_trait]
impl CareerAdvisor for AdvisorClient {
    async fn suggest_careers(&self, input: &str) -> Result<String, AdvisorError> {
        let user_prompt = prompts::ADVISOR_USER_TEMPLATE.replace("{input}", input);
        let request_body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::ADVISOR_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisorError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "advisor call succeeded"
            );
        }

        completion.first_content().ok_or(AdvisorError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_first_content_extracted() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {
                    "index": 0,
                    "finish_reason": "stop",
                    "message": {"role": "assistant", "content": "Consider data engineering roles."}
                }
            ],
            "usage": {"prompt_tokens": 42, "completion_tokens": 17, "total_tokens": 59}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.first_content().unwrap(),
            "Consider data engineering roles."
        );
    }

    #[test]
    fn test_empty_choices_yield_no_content() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.first_content().is_none());
    }

    #[test]
    fn test_whitespace_only_content_counts_as_empty() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.first_content().is_none());
    }

    #[test]
    fn test_error_envelope_parses_provider_message() {
        let body = r#"{"error": {"code": "content_filter", "message": "The response was filtered."}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "The response was filtered.");
    }

    #[test]
    fn test_user_template_embeds_input_verbatim() {
        let prompt =
            prompts::ADVISOR_USER_TEMPLATE.replace("{input}", "I like robotics and biology");
        assert_eq!(
            prompt,
            "Suggest suitable career paths based on: I like robotics and biology"
        );
    }
}
