//! OpenAI backend implementation.
//!
//! Uses the Chat Completions API for command generation with GPT models.

use crate::error::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";

/// OpenAI backend for GPT API.
pub struct OpenAIBackend {
    pub model: String,
    api_key: String,
    client: Client,
}

impl OpenAIBackend {
    pub fn new(client: Client, model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client,
        }
    }

    /// Generate a command from a query and system prompt.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_query,
                },
            ],
            max_tokens: 1024,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
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

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|source| GenerationError::Decode {
                provider: PROVIDER,
                source,
            })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse(PROVIDER))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
