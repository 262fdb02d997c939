// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat completion client for the meal generation model.
//!
//! Handles:
//! - OpenAI-compatible `/chat/completions` requests
//! - Request timeouts
//! - Rate limit and credential failures
//!
//! Every failure is reported as a single [`ProviderError`] so the caller can
//! decide whether to retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion request. The model identifier is supplied by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// The model call failed before producing text.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider rejected credentials")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Anything that turns a chat request into free text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible completion API (Groq by default).
///
/// Built once at startup and shared; it never holds a hard-coded key.
#[derive(Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Map a non-success status to an error.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                tracing::warn!("Completion provider rate limit hit (429)");
                Err(ProviderError::RateLimited)
            }
            401 | 403 => Err(ProviderError::Unauthorized),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Status { status: code, body })
            }
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let response = Self::check_response(response).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Malformed("no completion choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = CompletionBody {
            model: "llama3-8b-8192",
            messages: &messages,
            temperature: 0.5,
            top_p: 0.9,
            max_tokens: 5000,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 5000);
    }

    #[test]
    fn test_response_parsing() {
        let raw = serde_json::json!({
            "id": "x",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "### Day 1:"}
            }]
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("### Day 1:")
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OpenAiCompatClient::new(
            "https://api.groq.com/openai/v1/",
            "key".to_string(),
            "llama3-8b-8192".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(client.model(), "llama3-8b-8192");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let client = OpenAiCompatClient::new(
            "http://127.0.0.1:9",
            "key".to_string(),
            "m".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 10,
        };

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
