// src/services/openrouter.rs
//! OpenRouter chat-completion client and image generation.
//!
//! All model calls go through OpenRouter's OpenAI-compatible API; the
//! client-facing model names ("gpt-4", "gpt-3.5-turbo") are mapped to
//! provider-qualified identifiers here.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

const API_BASE: &str = "https://openrouter.ai/api/v1";
const SYSTEM_PROMPT: &str = "You are Brainwave AI, a helpful and intelligent assistant integrated into the Brainwave platform. Provide clear, concise, and accurate responses.";

#[derive(Debug, Error)]
pub enum OpenRouterError {
    #[error("AI provider not configured")]
    NotConfigured,

    #[error("Provider rate limit reached")]
    RateLimited,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned an error status: {0}")]
    ProviderRejected(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A completed chat turn: the assistant text plus total token usage
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub tokens: i64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: i64,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: String,
}

/// Map the client-facing model name to an OpenRouter model identifier.
fn resolve_model(model: &str) -> &'static str {
    if model == "gpt-4" {
        "openai/gpt-4"
    } else {
        "openai/gpt-3.5-turbo"
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterService {
    http: Client,
    api_key: Option<String>,
    app_url: String,
}

impl OpenRouterService {
    pub fn new(http: Client, api_key: Option<String>, app_url: String) -> Self {
        Self {
            http,
            api_key,
            app_url,
        }
    }

    pub fn from_env(http: Client, app_url: String) -> Self {
        let api_key = env::var("OPENROUTER_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok();
        Self::new(http, api_key, app_url)
    }

    fn key(&self) -> Result<&str, OpenRouterError> {
        self.api_key
            .as_deref()
            .ok_or(OpenRouterError::NotConfigured)
    }

    /// Run a single chat completion against the requested model.
    pub async fn chat(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<ChatCompletion, OpenRouterError> {
        let api_key = self.key()?;
        let resolved = resolve_model(model);

        let body = serde_json::json!({
            "model": resolved,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": 1000,
            "temperature": 0.7,
        });

        debug!(model = %resolved, "Sending chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", API_BASE))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.app_url)
            .header("X-Title", "Brainwave AI")
            .json(&body)
            .send()
            .await
            .map_err(|e| OpenRouterError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            error!("OpenRouter rate limit reached");
            return Err(OpenRouterError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "Chat completion rejected");
            return Err(OpenRouterError::ProviderRejected(status.as_u16()));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| OpenRouterError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                OpenRouterError::InvalidResponse("completion has no choices".to_string())
            })?;
        let tokens = completion.usage.map(|u| u.total_tokens).unwrap_or(0);

        info!(model = %resolved, tokens = tokens, "Chat completion received");

        Ok(ChatCompletion { content, tokens })
    }

    /// Generate an image and return its URL. Premium-gated at the route
    /// boundary.
    pub async fn generate_image(
        &self,
        prompt: &str,
        size: &str,
    ) -> Result<String, OpenRouterError> {
        let api_key = self.key()?;

        let body = serde_json::json!({
            "model": "dall-e-3",
            "prompt": prompt,
            "n": 1,
            "size": size,
        });

        let response = self
            .http
            .post(format!("{}/images/generations", API_BASE))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.app_url)
            .header("X-Title", "Brainwave AI")
            .json(&body)
            .send()
            .await
            .map_err(|e| OpenRouterError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(OpenRouterError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "Image generation rejected");
            return Err(OpenRouterError::ProviderRejected(status.as_u16()));
        }

        let image: ImageResponse = response
            .json()
            .await
            .map_err(|e| OpenRouterError::InvalidResponse(e.to_string()))?;

        image
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .ok_or_else(|| OpenRouterError::InvalidResponse("no image returned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_resolution() {
        assert_eq!(resolve_model("gpt-4"), "openai/gpt-4");
        assert_eq!(resolve_model("gpt-3.5-turbo"), "openai/gpt-3.5-turbo");
        assert_eq!(resolve_model("anything-else"), "openai/gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails_fast() {
        let service = OpenRouterService::new(
            Client::new(),
            None,
            "http://localhost:3000".to_string(),
        );
        assert!(matches!(
            service.chat("hello", "gpt-4").await,
            Err(OpenRouterError::NotConfigured)
        ));
    }

    #[test]
    fn test_completion_response_parsing() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        });
        let completion: CompletionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(completion.choices[0].message.content, "Hi there");
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }
}
