//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::classifier::Classifier;
use crate::config::{Config, CorsOrigins};
use crate::llm::{LlmRef, OllamaClient};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub classifier: Classifier,
}

impl AppState {
    pub fn new(config: Config, llm: LlmRef) -> Self {
        let classifier = Classifier::new(llm, config.model.clone());
        Self { config, classifier }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/api/classify", post(classify_todos))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm: LlmRef = Arc::new(OllamaClient::new(config.ollama_url.clone()));
    tracing::info!(
        "Using Ollama at {} with model {}",
        config.ollama_url,
        config.model
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, llm));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.classifier.model().to_string(),
    })
}

/// Classify a batch of todos.
///
/// An empty batch is answered directly. Any classification failure becomes a
/// 500 with a readable message; per-item problems never do.
async fn classify_todos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, (StatusCode, String)> {
    if req.todos.is_empty() {
        return Ok(Json(ClassifyResponse {
            results: Vec::new(),
        }));
    }

    state
        .classifier
        .classify(&req.todos)
        .await
        .map(|results| Json(ClassifyResponse { results }))
        .map_err(|e| {
            tracing::error!("Classification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Classification failed: {}", e),
            )
        })
}
