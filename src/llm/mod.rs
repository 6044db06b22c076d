//! LLM backend implementations.
//!
//! Provides one interface over the supported providers plus the
//! [`CommandGenerator`] the TUI talks to.

pub mod anthropic;
pub mod openai;

use crate::config::BackendConfig;
use crate::error::GenerationError;
use std::time::Duration;
use tracing::{debug, error, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Enum-based backend for LLM providers.
pub enum Backend {
    Anthropic(anthropic::AnthropicBackend),
    OpenAI(openai::OpenAIBackend),
}

impl Backend {
    /// Create a backend from configuration and an already resolved API key.
    pub fn new(config: &BackendConfig, api_key: String) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GenerationError::Client)?;

        let model = config.model().to_string();
        Ok(match config {
            BackendConfig::Anthropic { .. } => {
                Backend::Anthropic(anthropic::AnthropicBackend::new(client, model, api_key))
            }
            BackendConfig::OpenAI { .. } => {
                Backend::OpenAI(openai::OpenAIBackend::new(client, model, api_key))
            }
        })
    }

    /// Generate a command from a query and system prompt.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
    ) -> Result<String, GenerationError> {
        let raw = match self {
            Backend::Anthropic(b) => b.generate(system_prompt, user_query).await?,
            Backend::OpenAI(b) => b.generate(system_prompt, user_query).await?,
        };
        let command = clean_command(&raw);
        if command.is_empty() {
            return Err(GenerationError::EmptyResponse(self.name()));
        }
        Ok(command)
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Anthropic(_) => "Anthropic",
            Backend::OpenAI(_) => "OpenAI",
        }
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        match self {
            Backend::Anthropic(b) => &b.model,
            Backend::OpenAI(b) => &b.model,
        }
    }
}

/// Strip whitespace and markdown fences the model may add despite the rules.
pub fn clean_command(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop an info string such as "bash" on the opening fence line.
            let body = match rest.split_once('\n') {
                Some((_, body)) => body,
                None => rest,
            };
            body.trim_end_matches("```")
        }
        None => trimmed,
    };

    let unfenced = unfenced.trim();
    match unfenced.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        Some(inner) if !inner.contains('`') => inner.trim().to_string(),
        _ => unfenced.to_string(),
    }
}

/// Result of one generation request, as delivered to the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Everything sent to the model, for verbose display.
    pub full_prompt: String,
    /// The generated command, or the error message.
    pub result: Result<String, String>,
}

/// Combines a backend with the system prompt built at startup.
pub struct CommandGenerator {
    backend: Backend,
    system_prompt: String,
}

impl CommandGenerator {
    pub fn new(backend: Backend, system_prompt: String) -> Self {
        info!("Using {} ({})", backend.name(), backend.model());
        Self {
            backend,
            system_prompt,
        }
    }

    /// The exact text shown in verbose mode for `prompt`.
    pub fn full_prompt(&self, prompt: &str) -> String {
        format!("System: {}\n\nUser: {}", self.system_prompt, prompt)
    }

    /// Ask the model for a command. Never fails; errors become part of the
    /// completion so the TUI can show them.
    pub async fn generate(&self, prompt: &str) -> Completion {
        let prompt = prompt.trim();
        debug!("Generating command for: {}", prompt);

        let result = self
            .backend
            .generate(&self.system_prompt, prompt)
            .await
            .map_err(|e| {
                error!("Generation failed: {}", e);
                e.to_string()
            });

        if let Ok(command) = &result {
            debug!("Generated command: {}", command);
        }

        Completion {
            full_prompt: self.full_prompt(prompt),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_plain_command() {
        assert_eq!(clean_command("  ls -la\n"), "ls -la");
    }

    #[test]
    fn test_clean_fenced_command() {
        assert_eq!(clean_command("```bash\nfind . -name \"*.rs\"\n```"), "find . -name \"*.rs\"");
        assert_eq!(clean_command("```\ndu -sh *\n```"), "du -sh *");
    }

    #[test]
    fn test_clean_inline_backticks() {
        assert_eq!(clean_command("`ls -la`"), "ls -la");
    }

    #[test]
    fn test_clean_keeps_command_substitution() {
        assert_eq!(clean_command("echo `date`"), "echo `date`");
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_command("   "), "");
        assert_eq!(clean_command("```\n```"), "");
    }

    #[test]
    fn test_full_prompt_format() {
        let backend = Backend::new(&BackendConfig::default(), "sk-test".to_string()).unwrap();
        let generator = CommandGenerator::new(backend, "Be terse.".to_string());
        assert_eq!(
            generator.full_prompt("list files"),
            "System: Be terse.\n\nUser: list files"
        );
    }

    #[test]
    fn test_backend_from_config() {
        let config = BackendConfig::OpenAI {
            model: "gpt-4o".to_string(),
            api_key: None,
        };
        let backend = Backend::new(&config, "sk-test".to_string()).unwrap();
        assert_eq!(backend.name(), "OpenAI");
        assert_eq!(backend.model(), "gpt-4o");
    }
}
