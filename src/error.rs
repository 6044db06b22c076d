//! Error types for clippycli.
//!
//! Configuration errors are fatal and reported before the TUI starts.
//! Generation errors are recovered into the result screen. Action errors
//! are printed to stderr after the terminal has been restored.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{env_var} environment variable is required\n\
         Please set your {provider} API key: export {env_var}=your_key_here\n\
         (or add api_key to the [backend] section of {config_path})"
    )]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
        config_path: String,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Failures while asking the model for a command.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to connect to {provider} API: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API request failed with status {status}: {message}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failures of the confirm step (clipboard or shell).
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Failed to copy to clipboard: {0}")]
    ClipboardHolder(String),

    #[error("Failed to execute command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Command exited with code {0}")]
    ExitCode(i32),

    #[error("Command terminated by signal")]
    Signaled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_message_is_instructional() {
        let err = ConfigError::MissingApiKey {
            provider: "Anthropic",
            env_var: "ANTHROPIC_API_KEY",
            config_path: "~/.config/clippycli/config.toml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("ANTHROPIC_API_KEY environment variable is required"));
        assert!(msg.contains("export ANTHROPIC_API_KEY=your_key_here"));
    }

    #[test]
    fn test_empty_response_message() {
        let err = GenerationError::EmptyResponse("Anthropic");
        assert_eq!(err.to_string(), "Empty response from Anthropic");
    }

    #[test]
    fn test_exit_code_message() {
        assert_eq!(ActionError::ExitCode(2).to_string(), "Command exited with code 2");
    }
}
