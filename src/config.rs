//! Configuration management for clippycli.
//!
//! Configuration is loaded from `~/.config/clippycli/config.toml`. Every
//! field has a default, so a missing file is the same as an empty one.

use crate::context::Context;
use crate::error::ConfigError;
use crate::executor::Action;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// User preferences.
    #[serde(default)]
    pub preferences: Preferences,
}

/// Backend configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Anthropic Claude API.
    Anthropic {
        #[serde(default = "default_anthropic_model")]
        model: String,
        /// API key (prefer ANTHROPIC_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
    },
    /// OpenAI API.
    OpenAI {
        #[serde(default = "default_openai_model")]
        model: String,
        /// API key (prefer OPENAI_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Anthropic {
            model: default_anthropic_model(),
            api_key: None,
        }
    }
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

/// User preferences for command generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Prefer modern tools (rg/fd/bat over grep/find/cat).
    #[serde(default)]
    pub modern_tools: bool,
    /// Prefer verbose flags (--recursive over -r).
    #[serde(default)]
    pub verbose_flags: bool,
    /// What Enter does on the result screen.
    #[serde(default)]
    pub confirm_action: Action,
}

impl BackendConfig {
    /// Human-readable provider name.
    pub fn provider(&self) -> &'static str {
        match self {
            BackendConfig::Anthropic { .. } => "Anthropic",
            BackendConfig::OpenAI { .. } => "OpenAI",
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            BackendConfig::Anthropic { .. } => "ANTHROPIC_API_KEY",
            BackendConfig::OpenAI { .. } => "OPENAI_API_KEY",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            BackendConfig::Anthropic { model, .. } | BackendConfig::OpenAI { model, .. } => model,
        }
    }

    /// Replace the configured model, e.g. from `--model`.
    pub fn set_model(&mut self, new_model: String) {
        match self {
            BackendConfig::Anthropic { model, .. } | BackendConfig::OpenAI { model, .. } => {
                *model = new_model
            }
        }
    }

    fn configured_key(&self) -> Option<&str> {
        match self {
            BackendConfig::Anthropic { api_key, .. } | BackendConfig::OpenAI { api_key, .. } => {
                api_key.as_deref()
            }
        }
    }

    /// Resolve the API key from config first, then the environment.
    ///
    /// `env` is injected so the lookup can be tested without touching the
    /// process environment.
    pub fn resolve_api_key<F>(&self, env: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.configured_key()
            .map(str::to_string)
            .or_else(|| env(self.api_key_env()))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: self.provider(),
                env_var: self.api_key_env(),
                config_path: Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string()),
            })
    }
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("clippycli"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Log directory; `None` when no cache directory is known.
    pub fn log_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("clippycli"))
    }

    /// Load configuration from file, using defaults if not found.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Build the system prompt based on context and preferences.
    pub fn build_system_prompt(&self, context: &Context) -> String {
        let tools_note = if self.preferences.modern_tools {
            "Use modern tools when appropriate (ripgrep over grep, fd over find, bat over cat)"
        } else {
            "Use common Unix/Linux commands when possible"
        };

        let flags_note = if self.preferences.verbose_flags {
            "Prefer long flags for clarity (--recursive over -r)"
        } else {
            "Prefer short flags for brevity (-r over --recursive)"
        };

        let distro_info = context
            .distro
            .as_ref()
            .map(|d| format!("\nDistro: {}", d))
            .unwrap_or_default();

        format!(
            r#"You are a helpful command-line assistant. Given a user's description of what they want to do, generate a single, safe command that accomplishes their goal.

Rules:
1. Return ONLY the command, no explanations or markdown
2. Make sure the command is safe and won't cause harm
3. {}
4. If the request is unclear or potentially dangerous, suggest a safer alternative
5. For file operations, use relative paths unless absolute paths are specifically requested
6. Don't include commands that require sudo unless explicitly requested
7. {}

Examples:
User: "list all files in current directory"
Response: ls -la

User: "find all .go files"
Response: find . -name "*.go"

User: "create a new directory called myproject"
Response: mkdir myproject

Context:
OS: {}{}
Shell: {}
CWD: {}"#,
            tools_note,
            flags_note,
            context.os,
            distro_info,
            context.shell,
            context.cwd.display()
        )
    }
}
