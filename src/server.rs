//! HTTP API for the benchmark.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload` | Index a document (multipart `file` field, or raw body with optional `?filename=`) |
//! | `POST` | `/compare` | Answer `{query, doc_id}` with both pipelines |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "no_document_indexed", "message": "..." } }
//! ```
//!
//! | Error | Status |
//! |-------|--------|
//! | `empty_document`, `load_error`, `bad_request` | 400 |
//! | `payload_too_large` | 413 |
//! | `index_not_ready`, `no_document_indexed`, `agent_not_initialized` | 409 |
//! | `timeout` | 408 |
//! | `provider_error` | 502 |
//! | anything else | 500 |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! can call the API directly.

use arag_bench_core::models::ComparisonResult;
use arag_bench_core::RagError;
use axum::{
    body::Bytes,
    extract::{
        rejection::JsonRejection, DefaultBodyLimit, FromRequest, Multipart, Query, Request, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::engine::Engine;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
/// Multipart field holding the uploaded document.
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let engine = Arc::new(Engine::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "A-RAG Bench server listening");
    axum::serve(listener, router(engine)).await?;
    Ok(())
}

/// Builds the application router around an existing engine.
pub fn router(engine: Arc<Engine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(handle_upload))
        .route("/compare", post(handle_compare))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(AppState { engine })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Error for a body axum could not read, keeping its status.
fn rejected(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError {
            status,
            code: "payload_too_large".to_string(),
            message,
        }
    } else {
        bad_request(message)
    }
}

pub fn status_for(err: &RagError) -> StatusCode {
    match err {
        RagError::EmptyDocument | RagError::Load(_) => StatusCode::BAD_REQUEST,
        RagError::IndexNotReady | RagError::NoDocumentIndexed | RagError::AgentNotInitialized => {
            StatusCode::CONFLICT
        }
        RagError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
        RagError::Provider(_) => StatusCode::BAD_GATEWAY,
        RagError::ChunkNotFound(_)
        | RagError::InvalidTransition { .. }
        | RagError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(code = err.code(), error = %err, "request failed");
        }
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /upload ============

#[derive(Deserialize)]
struct UploadParams {
    filename: Option<String>,
}

#[derive(Serialize)]
struct UploadResponse {
    status: String,
    doc_id: String,
    filename: Option<String>,
    chunks: usize,
}

/// Handler for `POST /upload`.
///
/// Accepts `multipart/form-data` with the document in the `file` field,
/// or the raw document bytes as the body. A successful upload replaces
/// the active document.
async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    let (body, filename) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        let (body, part_name) = read_upload_field(multipart).await?;
        (body, part_name.or(params.filename))
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        (body, params.filename)
    };

    if body.is_empty() {
        return Err(bad_request("upload must contain the document bytes"));
    }

    let report = state.engine.ingest(&body).await?;
    info!(
        doc_id = %report.document_id,
        filename = filename.as_deref().unwrap_or("-"),
        bytes = body.len(),
        "upload indexed"
    );

    Ok(Json(UploadResponse {
        status: "indexed".to_string(),
        doc_id: report.document_id,
        filename,
        chunks: report.chunks,
    }))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Bytes and client filename of the `file` part; other parts are skipped.
async fn read_upload_field(
    mut multipart: Multipart,
) -> Result<(Bytes, Option<String>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let body = field
            .bytes()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        return Ok((body, filename));
    }
    Err(bad_request(format!(
        "multipart upload must contain a `{}` field",
        UPLOAD_FIELD
    )))
}

// ============ POST /compare ============

#[derive(Deserialize)]
struct CompareRequest {
    query: String,
    #[serde(default)]
    doc_id: Option<String>,
}

/// Handler for `POST /compare`.
async fn handle_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let result = state
        .engine
        .compare(&req.query, req.doc_id.as_deref())
        .await?;
    Ok(Json(result))
}
