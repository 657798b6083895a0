//! Todo classification.
//!
//! Turns a batch of todos into one prompt, makes a single call to the model,
//! and normalizes whatever comes back into exactly one result per todo.
//!
//! ```text
//!  todos ──► prompt ──► LlmClient ──► normalize ──► results
//! ```

mod normalize;
mod prompt;
mod types;

pub use normalize::parse_response;
pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
pub use types::{Category, ClassificationResult, TodoItem};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::llm::{ChatMessage, ChatOptions, LlmRef};
use crate::util::truncate_chars;

/// Failure of a whole classification request.
///
/// Problems with individual items never surface here; they are replaced by
/// fallback results.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The reply contained no recoverable JSON.
    #[error("Could not parse model response: {excerpt}")]
    Parse { excerpt: String },

    /// The inference backend could not be reached or returned an error.
    #[error("Inference backend failed: {0}")]
    Backend(anyhow::Error),
}

/// Classifies todo batches with a single model.
pub struct Classifier {
    llm: LlmRef,
    model: String,
}

impl Classifier {
    pub fn new(llm: LlmRef, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify a batch against the current time.
    pub async fn classify(
        &self,
        todos: &[TodoItem],
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        self.classify_at(todos, Utc::now()).await
    }

    /// Classify a batch as if it were `now`.
    ///
    /// An empty batch returns an empty result without contacting the model.
    /// Otherwise the result has one entry per todo, in input order.
    pub async fn classify_at(
        &self,
        todos: &[TodoItem],
        now: DateTime<Utc>,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        let Some(user_prompt) = build_user_prompt(todos, now) else {
            return Ok(Vec::new());
        };

        info!("Classifying {} todos with {}...", todos.len(), self.model);

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ];
        let response = self
            .llm
            .chat_completion(&self.model, &messages, ChatOptions::json())
            .await
            .map_err(ClassifyError::Backend)?;

        info!(
            "Raw model response from {} ({}): {}",
            response.model.as_deref().unwrap_or(&self.model),
            format_duration(response.total_duration),
            truncate_chars(&response.content, 300)
        );

        let results = parse_response(&response.content, todos)?;
        info!("Classification complete: {} items classified.", results.len());
        Ok(results)
    }
}

/// Backend-reported generation time, nanoseconds to milliseconds.
fn format_duration(total_duration: Option<u64>) -> String {
    match total_duration {
        Some(nanos) => format!("{} ms", nanos / 1_000_000),
        None => "duration unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlm;
    use crate::llm::Role;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn todo(id: i64, text: &str) -> TodoItem {
        TodoItem {
            id,
            text: text.to_string(),
            completed: false,
            due_date: None,
            repeat: None,
            timestamp: "2026-10-16T08:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_batch_skips_backend() {
        let llm = Arc::new(MockLlm::replying("{}"));
        let classifier = Classifier::new(llm.clone(), "llama3.2");

        let results = classifier.classify(&[]).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn sends_system_and_user_prompt_with_json_hint() {
        let llm = Arc::new(MockLlm::replying(
            r#"{"results":[{"id":1,"category":"Health","importance":8,"reasoning":"Appointment."}]}"#,
        ));
        let classifier = Classifier::new(llm.clone(), "llama3.2");
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let todos = vec![todo(1, "Call the doctor")];

        let results = classifier.classify_at(&todos, now).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, Category::Health);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.model, "llama3.2");
        assert!(call.json_output);
        assert_eq!(call.messages[0].role, Role::System);
        assert_eq!(call.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(call.messages[1].role, Role::User);
        assert_eq!(
            Some(call.messages[1].content.clone()),
            build_user_prompt(&todos, now)
        );
    }

    #[tokio::test]
    async fn every_input_gets_a_result() {
        let llm = Arc::new(MockLlm::replying(
            r#"Sure, here you go: {"results":[{"id":20,"category":"Finance","importance":12}]} Hope that helps."#,
        ));
        let classifier = Classifier::new(llm, "llama3.2");
        let todos = vec![todo(10, "a"), todo(20, "b"), todo(30, "c")];

        let results = classifier.classify(&todos).await.unwrap();

        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(results[1].category, Category::Finance);
        assert_eq!(results[1].importance, 10);
        assert_eq!(results[0], ClassificationResult::fallback(10));
        assert_eq!(results[2], ClassificationResult::fallback(30));
    }

    #[tokio::test]
    async fn reported_duration_does_not_affect_results() {
        let llm = Arc::new(
            MockLlm::replying(r#"{"results":[{"id":1,"category":"Home","importance":2}]}"#)
                .with_total_duration(2_500_000_000),
        );
        let classifier = Classifier::new(llm, "llama3.2");

        let results = classifier.classify(&[todo(1, "Water plants")]).await.unwrap();

        assert_eq!(results[0].category, Category::Home);
    }

    #[test]
    fn format_duration_in_millis() {
        assert_eq!(format_duration(Some(2_500_000_000)), "2500 ms");
        assert_eq!(format_duration(None), "duration unknown");
    }

    #[tokio::test]
    async fn backend_failure_is_fatal() {
        let llm = Arc::new(MockLlm::failing("Connection failed: connection refused"));
        let classifier = Classifier::new(llm, "llama3.2");

        let err = classifier.classify(&[todo(1, "x")]).await.unwrap_err();

        assert!(matches!(err, ClassifyError::Backend(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn unparseable_reply_is_fatal() {
        let llm = Arc::new(MockLlm::replying("no json here"));
        let classifier = Classifier::new(llm, "llama3.2");

        let err = classifier.classify(&[todo(1, "x")]).await.unwrap_err();

        assert!(matches!(err, ClassifyError::Parse { .. }));
        assert_eq!(err.to_string(), "Could not parse model response: no json here");
    }
}
