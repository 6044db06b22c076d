//! Anthropic Claude backend implementation.
//!
//! Uses the Messages API for command generation with Claude models.

use crate::error::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "Anthropic";
const MAX_TOKENS: u32 = 1024;

/// Anthropic backend for Claude API.
pub struct AnthropicBackend {
    pub model: String,
    api_key: String,
    client: Client,
}

impl AnthropicBackend {
    pub fn new(client: Client, model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client,
        }
    }

    /// Send one system + user turn and return the first text block.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
    ) -> Result<String, GenerationError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_query,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|source| GenerationError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Api {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|source| GenerationError::Decode {
                provider: PROVIDER,
                source,
            })?;

        first_text(&body).ok_or(GenerationError::EmptyResponse(PROVIDER))
    }
}

fn first_text(response: &MessagesResponse) -> Option<String> {
    response
        .content
        .iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text.clone())
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
