//! Configuration management for DocAI
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Precedence, lowest first: built-in defaults, the YAML file, `DOCAI_*`
//! environment variables, command-line flags.

use crate::error::{DocaiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/docai.yaml";

/// Main configuration structure for DocAI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Where the bearer credential is persisted
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Transcript texts and rendering
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the Document AI backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout applied to every request; unset means unbounded
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

impl ServerConfig {
    /// Timeout as a `Duration`, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Credential storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// JSON file in the user's data directory (or `credentials.path`)
    #[default]
    File,
    /// Operating system keyring
    Keyring,
    /// Process memory only; nothing survives a restart
    Memory,
}

impl std::str::FromStr for CredentialBackend {
    type Err = DocaiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(DocaiError::Config(format!(
                "Invalid credential backend: {}. Must be one of: file, keyring, memory",
                other
            ))),
        }
    }
}

/// Credential persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: CredentialBackend,

    /// File path for the `file` backend; defaults to the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Conversation texts and citation rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Assistant turn recorded when a session is first opened
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Assistant turn recorded when a question fails
    #[serde(default = "default_apology_message")]
    pub apology_message: String,

    /// Characters of each citation preview shown before truncation
    #[serde(default = "default_citation_preview_chars")]
    pub citation_preview_chars: usize,
}

fn default_welcome_message() -> String {
    "Hello! I'm your Document AI Assistant. You can ask me questions about the document you've uploaded."
        .to_string()
}

fn default_apology_message() -> String {
    "Sorry, I couldn't process your question. Please try again.".to_string()
}

fn default_citation_preview_chars() -> usize {
    100
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            apology_message: default_apology_message(),
            citation_preview_chars: default_citation_preview_chars(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocaiError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DocaiError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("DOCAI_BASE_URL") {
            self.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("DOCAI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid DOCAI_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("DOCAI_CREDENTIAL_BACKEND") {
            match backend.parse() {
                Ok(value) => self.credentials.backend = value,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if let Ok(path) = std::env::var("DOCAI_CREDENTIAL_PATH") {
            self.credentials.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            self.server.base_url = base_url.clone();
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`DocaiError::Config`] describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let base_url = url::Url::parse(&self.server.base_url).map_err(|e| {
            DocaiError::Config(format!(
                "Invalid server.base_url {}: {}",
                self.server.base_url, e
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DocaiError::Config(format!(
                "server.base_url must use http or https: {}",
                self.server.base_url
            ))
            .into());
        }

        if self.server.timeout_seconds == Some(0) {
            return Err(DocaiError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.conversation.citation_preview_chars == 0 {
            return Err(DocaiError::Config(
                "conversation.citation_preview_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
