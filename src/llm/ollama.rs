//! Ollama chat API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::LlmError;
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient};
use crate::util::truncate_chars;

/// Default address of a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Ollama API client.
///
/// Issues a single non-streaming `/api/chat` call per request. No timeout is
/// configured on the underlying client; slow local models are expected.
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a new client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Execute a single request.
    async fn execute_request(&self, request: &OllamaChatRequest) -> Result<ChatResponse, LlmError> {
        let response = match self.client.post(self.chat_url()).json(request).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        parse_chat_body(&body, &request.model)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        let request = OllamaChatRequest::new(model, messages, &options);

        tracing::debug!("Sending request to Ollama: model={} url={}", model, self.chat_url());

        self.execute_request(&request).await.map_err(|e| {
            tracing::error!("Ollama request failed: {}", e);
            anyhow::anyhow!("{}", e)
        })
    }
}

fn parse_chat_body(body: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let parsed: OllamaChatResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::parse_error(format!(
            "Failed to parse response: {}, body: {}",
            e,
            truncate_chars(body, 500)
        ))
    })?;

    Ok(ChatResponse {
        content: parsed.message.map(|m| m.content).unwrap_or_default(),
        model: parsed.model.or_else(|| Some(requested_model.to_string())),
        total_duration: parsed.total_duration,
    })
}

/// Ollama `/api/chat` request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaModelOptions>,
}

impl OllamaChatRequest {
    fn new(model: &str, messages: &[ChatMessage], options: &ChatOptions) -> Self {
        Self {
            model: model.to_string(),
            messages: messages.to_vec(),
            stream: false,
            format: options.json_output.then(|| "json".to_string()),
            options: options
                .temperature
                .map(|temperature| OllamaModelOptions { temperature }),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaModelOptions {
    temperature: f64,
}

/// Ollama `/api/chat` response format (non-streaming).
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<OllamaResponseMessage>,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}
