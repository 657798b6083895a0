//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassificationResult, TodoItem};

/// Request to classify a batch of todos.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub todos: Vec<TodoItem>,
}

/// Classification results, one per submitted todo, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub results: Vec<ClassificationResult>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
}
