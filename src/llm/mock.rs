//! In-memory `LlmClient` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient};

/// A recorded `chat_completion` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub json_output: bool,
}

/// Returns a canned reply (or error) and records every call.
pub struct MockLlm {
    reply: Result<String, String>,
    total_duration: Option<u64>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlm {
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            reply: Ok(content.into()),
            total_duration: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            total_duration: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report a generation time, in nanoseconds, with every reply.
    pub fn with_total_duration(mut self, nanos: u64) -> Self {
        self.total_duration = Some(nanos);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            json_output: options.json_output,
        });

        match &self.reply {
            Ok(content) => Ok(ChatResponse {
                content: content.clone(),
                model: Some(model.to_string()),
                total_duration: self.total_duration,
            }),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}
