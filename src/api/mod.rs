//! Read-only HTTP API over the observation history.
//!
//! Serves the same projections as the `current` and `history` subcommands:
//!
//! - `GET /` - liveness message
//! - `GET /api/current-ip` - latest value and the one before it, or 404
//! - `GET /api/ip-history?limit=N` - history, most recent first

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::history::HistoryStore;
use crate::history::query::{self, HistoryEntry};

/// Query parameters accepted by `/api/ip-history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of entries to return
    pub limit: Option<usize>,
}

/// Builds the API router over `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
    S: HistoryStore + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/api/current-ip", get(current_ip::<S>))
        .route("/api/ip-history", get(ip_history::<S>))
        .with_state(store)
        .layer(CorsLayer::permissive())
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the accept loop.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Read API listening on http://{addr}");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Dynamic IP Monitor API is running!",
    }))
}

async fn current_ip<S: HistoryStore>(State(store): State<Arc<S>>) -> Response {
    match query::current_ip(store.as_ref()) {
        Some(current) => Json(current).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "No IP found" })),
        )
            .into_response(),
    }
}

async fn ip_history<S: HistoryStore>(
    State(store): State<Arc<S>>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<HistoryEntry>> {
    Json(query::ip_history(store.as_ref(), params.limit))
}
