//! LLM client module for talking to the inference backend.
//!
//! This module provides a trait-based abstraction over the text generator,
//! with a local Ollama server as the implementation.

mod error;
#[cfg(test)]
pub(crate) mod mock;
mod ollama;

pub use error::{LlmError, LlmErrorKind};
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a simple text message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text. Empty if the backend returned nothing.
    pub content: String,
    pub model: Option<String>,
    /// Total generation time reported by the backend, in nanoseconds.
    pub total_duration: Option<u64>,
}

/// Optional parameters for chat completions.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Ask the backend to constrain output to machine-parseable JSON.
    ///
    /// This is a hint only; callers must still cope with non-JSON text.
    pub json_output: bool,
    /// Sampling temperature (0 = deterministic).
    pub temperature: Option<f64>,
}

impl ChatOptions {
    pub fn json() -> Self {
        Self {
            json_output: true,
            ..Self::default()
        }
    }
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat completion request and return the generated text.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse>;
}

/// Shared handle to an LLM client.
pub type LlmRef = Arc<dyn LlmClient>;
