//! Read-only JSON HTTP API over the registry.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/entries` | All entries: ETL, then agents, then configs |
//! | `GET` | `/entries/{category}` | Entries for one category (unknown category → `[]`) |
//! | `GET` | `/entries/{category}/{slug}` | One entry |
//! | `GET` | `/search?q=&category=` | Substring search |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "entry not found: etl/nope" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//! A missing or malformed `registry.yaml` is reported as `internal` on every
//! request until fixed and the server restarted.
//!
//! All handlers share one [`Registry`], so the manifest is parsed once for
//! the life of the process. Registry reads touch the filesystem and run on
//! the blocking pool.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use cookbook_core::models::{Category, EnrichedEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::get::{get_entry, EntryNotFound};
use crate::registry::Registry;
use crate::search::{search_entries, SearchHit};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    registry: Arc<Registry>,
}

/// Build the API router. Exposed separately from [`run_server`] for tests.
pub fn router(registry: Arc<Registry>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/entries", get(handle_all_entries))
        .route("/entries/{category}", get(handle_category))
        .route("/entries/{category}/{slug}", get(handle_entry))
        .route("/search", get(handle_search))
        .layer(cors)
        .with_state(AppState { registry })
}

/// Starts the HTTP server on `[server].bind`. Runs until the process exits.
pub async fn run_server(config: &Config, registry: Arc<Registry>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    // Fail fast on a broken registry instead of on the first request.
    let preload = registry.clone();
    tokio::task::spawn_blocking(move || preload.manifest().map(|_| ())).await??;

    let app = router(registry);

    println!("Cookbook API listening on http://{}", bind_addr);
    info!(bind = %bind_addr, "server started");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
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

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps registry errors onto HTTP statuses. Anything but a missing entry is
/// a server-side failure.
fn classify_error(err: anyhow::Error) -> AppError {
    if let Some(missing) = err.downcast_ref::<EntryNotFound>() {
        return not_found(missing.to_string());
    }
    let msg = format!("{:#}", err);
    error!(error = %msg, "registry request failed");
    internal(msg)
}

/// Run a registry call on the blocking pool.
async fn with_registry<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Registry) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let registry = state.registry.clone();
    tokio::task::spawn_blocking(move || f(&registry))
        .await
        .map_err(|e| internal(format!("registry task failed: {}", e)))?
        .map_err(classify_error)
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

// ============ GET /entries ============

async fn handle_all_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrichedEntry>>, AppError> {
    let entries = with_registry(&state, |r| r.all_entries()).await?;
    Ok(Json(entries))
}

async fn handle_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<EnrichedEntry>>, AppError> {
    let entries = with_registry(&state, move |r| r.entries_by_key(&category)).await?;
    Ok(Json(entries))
}

async fn handle_entry(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<Json<EnrichedEntry>, AppError> {
    let category = Category::from_key(&category)
        .ok_or_else(|| not_found(format!("unknown category: {}", category)))?;
    let entry = with_registry(&state, move |r| get_entry(r, category, &slug)).await?;
    Ok(Json(entry))
}

// ============ GET /search ============

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    category: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let category = match params.category.as_deref() {
        None | Some("") => None,
        Some(key) => match Category::from_key(key) {
            Some(c) => Some(c),
            None => return Ok(Json(SearchResponse { results: vec![] })),
        },
    };

    let results = with_registry(&state, move |r| search_entries(r, &params.q, category)).await?;
    Ok(Json(SearchResponse { results }))
}
