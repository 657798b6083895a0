//! Configuration management for the todo classifier.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `OLLAMA_URL` - Optional. Base URL of the Ollama server. Defaults to `http://127.0.0.1:11434`.
//! - `CLASSIFIER_MODEL` - Optional. Model used for classification. Defaults to `llama3.2`.
//! - `CORS_ALLOWED_ORIGINS` - Optional. Comma-separated browser origins allowed to call the API.
//!   `*` allows any origin. Defaults to the local Vite dev/preview ports.

use thiserror::Error;

use crate::llm::DEFAULT_OLLAMA_URL;
use crate::util::split_csv;

pub const DEFAULT_MODEL: &str = "llama3.2";

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:4173",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        let origins = split_csv(value);
        if origins.iter().any(|o| o == "*") {
            return Ok(CorsOrigins::Any);
        }
        if origins.is_empty() {
            return Err(ConfigError::InvalidValue(
                "CORS_ALLOWED_ORIGINS".to_string(),
                "no origins given".to_string(),
            ));
        }
        if let Some(bad) = origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ConfigError::InvalidValue(
                "CORS_ALLOWED_ORIGINS".to_string(),
                format!("origin must start with http:// or https://: {}", bad),
            ));
        }
        Ok(CorsOrigins::List(origins))
    }
}

impl Default for CorsOrigins {
    fn default() -> Self {
        CorsOrigins::List(DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect())
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Base URL of the Ollama server
    pub ollama_url: String,

    /// Model name passed to Ollama
    pub model: String,

    /// Allowed CORS origins
    pub cors_origins: CorsOrigins,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number
    /// or `CORS_ALLOWED_ORIGINS` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let ollama_url = lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let model = lookup("CLASSIFIER_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let cors_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => CorsOrigins::parse(&value)?,
            None => CorsOrigins::default(),
        };

        Ok(Self {
            host,
            port,
            ollama_url,
            model,
            cors_origins,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(ollama_url: String, model: String) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            ollama_url,
            model,
            cors_origins: CorsOrigins::default(),
        }
    }
}
