//! Prompt construction for batch classification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{Category, ClassificationResult, TodoItem};

/// System prompt describing the classification task and output contract.
pub const SYSTEM_PROMPT: &str = r#"You are a productivity assistant that classifies todo items and ranks their importance.

For each todo item you will determine:
1. category - exactly one of: Work, Personal, Health, Finance, Learning, Home, Social, Other
2. importance - integer 1-10 (10 = most critical), factoring in:
   - Due date proximity: overdue or within 24 hours = higher importance
   - Repeat frequency: daily tasks are generally high-priority recurring commitments
   - Keywords implying urgency: "urgent", "asap", "deadline", "doctor", "bill", "call", etc.
   - Task nature: health and finance items tend to carry higher stakes
   - Completed tasks: always score 1 regardless of other factors
3. reasoning - one concise sentence explaining the classification and score

Always return a JSON object with a "results" array. Never include markdown or explanatory text outside the JSON."#;

/// The subset of a todo the model gets to see.
#[derive(Serialize)]
struct PromptTodo<'a> {
    id: i64,
    text: &'a str,
    completed: bool,
    #[serde(rename = "dueDate")]
    due_date: Option<&'a str>,
    repeat: Option<&'a str>,
}

impl<'a> From<&'a TodoItem> for PromptTodo<'a> {
    fn from(todo: &'a TodoItem) -> Self {
        Self {
            id: todo.id,
            text: &todo.text,
            completed: todo.completed,
            due_date: todo.due_date.as_deref(),
            repeat: todo.repeat.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ExampleEnvelope {
    results: Vec<ClassificationResult>,
}

/// Build the user prompt for a batch.
///
/// Returns `None` for an empty batch; there is nothing to ask the model.
pub fn build_user_prompt(todos: &[TodoItem], now: DateTime<Utc>) -> Option<String> {
    if todos.is_empty() {
        return None;
    }

    let serialized: Vec<PromptTodo<'_>> = todos.iter().map(PromptTodo::from).collect();
    let example = ExampleEnvelope {
        results: vec![ClassificationResult {
            id: 0,
            category: Category::Work,
            importance: 7,
            reasoning: "Example reasoning.".to_string(),
        }],
    };

    let items_json = serde_json::to_string_pretty(&serialized).unwrap_or_default();
    let example_json = serde_json::to_string_pretty(&example).unwrap_or_default();
    let n = todos.len();

    Some(format!(
        "Current UTC time: {now}\n\n\
         Classify these {n} todo items:\n\
         {items_json}\n\n\
         Return a JSON object with a 'results' key containing exactly {n} objects, one per todo, in the same order.\n\
         Example format:\n\
         {example_json}",
        now = now.to_rfc3339(),
    ))
}
