//! # Todo Classifier
//!
//! HTTP service that asks a local Ollama model to categorize todo items and
//! score their importance.
//!
//! ## Architecture
//!
//! ```text
//!   POST /api/classify
//!          │
//!          ▼
//!   ┌──────────────┐   prompt    ┌──────────────┐
//!   │  Classifier  │ ──────────► │   Ollama     │
//!   │              │ ◄────────── │   /api/chat  │
//!   └──────┬───────┘  raw text   └──────────────┘
//!          │ normalize
//!          ▼
//!   one result per todo
//! ```
//!
//! ## Modules
//! - `api`: axum router and handlers
//! - `classifier`: prompt building and response normalization
//! - `llm`: `LlmClient` trait and the Ollama client
//! - `config`: environment configuration

pub mod api;
pub mod classifier;
pub mod config;
pub mod llm;
pub mod util;

pub use classifier::{Category, ClassificationResult, Classifier, ClassifyError, TodoItem};
pub use config::Config;
