//! HTTP API for the todo classifier.
//!
//! ## Endpoints
//!
//! - `POST /api/classify` - Classify a batch of todos
//! - `GET /health` - Health check

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
