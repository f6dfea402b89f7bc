//! Configuration management for the task tracker.
//!
//! Configuration can be set via environment variables:
//! - `DATABASE_PATH` - Optional. SQLite database file. Defaults to `tasks.db`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `OPENROUTER_API_KEY` - Required by the chat front-end only.
//! - `DEFAULT_MODEL` - Optional. Chat model. Defaults to `anthropic/claude-sonnet-4.5`.
//! - `MAX_ITERATIONS` - Optional. Tool-calling rounds per chat turn. Defaults to `10`.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "tasks.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4.5";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Process configuration, shared by the server and the chat front-end.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// OpenRouter API key, if configured
    pub api_key: Option<String>,

    /// LLM model identifier (OpenRouter format)
    pub default_model: String,

    /// Maximum LLM round-trips per chat turn
    pub max_iterations: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` or `MAX_ITERATIONS` don't parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_path = var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ConfigError::InvalidValue("PORT".to_string(), format!("{}", e))
            })?,
            None => DEFAULT_PORT,
        };

        let max_iterations = match var("MAX_ITERATIONS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e))
            })?,
            None => DEFAULT_MAX_ITERATIONS,
        };
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_path,
            host,
            port,
            api_key: var("OPENROUTER_API_KEY"),
            default_model: var("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_iterations,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// The API key, for callers that can't run without one.
    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))
    }

    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
