//! HTTP handlers for the server.

pub mod invoices;
pub mod templates;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{Value, json};

use super::state::AppState;

/// Handle GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "pdfBackend": state.pdf.name(),
        "bootTime": state.boot_time,
    }))
}
