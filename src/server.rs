//! HTTP chat server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness message |
//! | `GET`  | `/health` | Health check (version and index size) |
//! | `POST` | `/api/chat` | Answer a message within a session |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Empty message" } }
//! ```
//!
//! Error codes: `bad_request` (400), `timeout` (504), `internal` (500).
//! Internal failures are logged and reported with a generic message.
//!
//! # CORS
//!
//! Only the configured origins are allowed, with credentials; requested
//! methods and headers are mirrored. A `"*"` entry allows any origin
//! without credentials.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use ragchat_core::session::InMemorySessionStore;

use crate::chat::{ChatError, ChatReply, ChatService, ChatSettings};
use crate::config::{Config, ServerConfig};
use crate::embedding::create_embedder;
use crate::store;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    chat: ChatService,
    request_timeout: Duration,
}

/// Starts the chat server.
///
/// Loads the index first and refuses to start if it is missing or
/// corrupt. Runs until the process receives Ctrl-C.
pub async fn run_server(config: &Config) -> Result<()> {
    let index = store::load_index(&config.index.path)?;
    let embedder = create_embedder(&config.embedding)?;
    tracing::info!(
        chunks = index.len(),
        documents = index.document_count(),
        dims = index.dims(),
        model = embedder.model_name(),
        "index loaded"
    );

    let chat = ChatService::new(
        Arc::new(index),
        embedder,
        Arc::new(InMemorySessionStore::new(config.chat.max_history_pairs)),
        ChatSettings::from_config(config),
    );
    let app = build_router(chat, &config.server)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!("chat server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Build the router with CORS and per-request timeout applied.
pub fn build_router(chat: ChatService, server: &ServerConfig) -> Result<Router> {
    let state = AppState {
        chat,
        request_timeout: Duration::from_secs(server.request_timeout_secs),
    };

    Ok(Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .layer(cors_layer(&server.cors_origins)?)
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"timeout"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn timeout_error() -> AppError {
    AppError {
        status: StatusCode::GATEWAY_TIMEOUT,
        code: "timeout",
        message: "Request timeout".to_string(),
    }
}

fn internal_error() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: "System error. Please try again later.".to_string(),
    }
}

// ============ GET / ============

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Backend running" }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Number of chunks in the loaded index.
    chunks: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chunks: state.chat.index().len(),
    })
}

// ============ POST /api/chat ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    message: String,
    session_id: String,
}

/// Handler for `POST /api/chat`.
///
/// Returns `400` for an empty message, `504` if the reply takes longer
/// than `server.request_timeout_secs`, and `500` for anything else.
async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let outcome = tokio::time::timeout(
        state.request_timeout,
        state.chat.reply(&req.session_id, &req.message),
    )
    .await;

    match outcome {
        Ok(Ok(reply)) => {
            tracing::info!(
                session_id = %req.session_id,
                sources = reply.sources.len(),
                history = reply.history_size,
                "chat reply"
            );
            Ok(Json(reply))
        }
        Ok(Err(ChatError::EmptyMessage)) => Err(bad_request("Empty message")),
        Ok(Err(ChatError::Internal(e))) => {
            tracing::error!(session_id = %req.session_id, "chat failed: {:#}", e);
            Err(internal_error())
        }
        Err(_) => {
            tracing::warn!(session_id = %req.session_id, "chat request timed out");
            Err(timeout_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_bad_origin() {
        assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_cors_wildcard() {
        assert!(cors_layer(&["*".to_string()]).is_ok());
    }
}
