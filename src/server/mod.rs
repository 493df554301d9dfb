//! # HTTP Server
//!
//! JSON and HTML API over the design engine. Every `/api` route requires the
//! `x-organization-id` header; records belonging to another organization
//! answer 404.
//!
//! ## Usage
//!
//! ```bash
//! billsend serve --listen 0.0.0.0:8080 --seed demos/invoices.json
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Returns |
//! |--------|------|---------|
//! | GET | `/health` | status JSON |
//! | GET | `/api/templates` | presets then custom templates |
//! | POST | `/api/templates` | created custom template (201) |
//! | GET/PUT | `/api/templates/:id` | one template / updated custom template |
//! | POST | `/api/invoices/:id/preview` | interactive HTML fragment |
//! | POST | `/api/invoices/:id/resolve` | resolved style JSON |
//! | GET | `/api/invoices/:id/print` | print-ready HTML document |
//! | GET | `/api/invoices/:id/pdf` | PDF, shown inline |
//! | POST | `/api/invoices/:id/snapshot` | stored design snapshot |
//! | GET/PUT/DELETE | `/api/invoices/:id/draft` | autosaved design draft |

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, ORGANIZATION_HEADER, OrgId};

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::drafts::{DraftStore, FileDraftStore, MemoryDraftStore};
use crate::error::BillsendError;
use crate::store::memory::{MemoryRepository, Seed};
use crate::store::DesignRepository;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Templates
        .route(
            "/api/templates",
            get(handlers::templates::list).post(handlers::templates::create),
        )
        .route(
            "/api/templates/:id",
            get(handlers::templates::get).put(handlers::templates::update),
        )
        // Invoices
        .route("/api/invoices/:id/preview", post(handlers::invoices::preview))
        .route("/api/invoices/:id/resolve", post(handlers::invoices::resolve))
        .route("/api/invoices/:id/print", get(handlers::invoices::print))
        .route("/api/invoices/:id/pdf", get(handlers::invoices::pdf))
        .route("/api/invoices/:id/snapshot", post(handlers::invoices::snapshot))
        .route(
            "/api/invoices/:id/draft",
            get(handlers::invoices::get_draft)
                .put(handlers::invoices::put_draft)
                .delete(handlers::invoices::delete_draft),
        )
        .layer(middleware::map_response_with_state(
            state.clone(),
            error::redact_internal_errors,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
///
/// ## Example
///
/// ```no_run
/// use billsend::config::AppConfig;
/// use billsend::server::serve;
///
/// # async fn example() -> Result<(), billsend::BillsendError> {
/// serve(AppConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: AppConfig) -> Result<(), BillsendError> {
    let repo: Arc<dyn DesignRepository> = match &config.seed_path {
        Some(path) => Arc::new(MemoryRepository::from_seed(Seed::load(path).await?)?),
        None => Arc::new(MemoryRepository::new()),
    };
    let drafts: Arc<dyn DraftStore> = match &config.draft_dir {
        Some(dir) => Arc::new(FileDraftStore::new(dir.clone())),
        None => Arc::new(MemoryDraftStore::new()),
    };
    let pdf = config.pdf_backend()?;

    let state = Arc::new(AppState::new(config.clone(), repo, pdf, drafts));
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            BillsendError::Config(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        environment = ?config.environment,
        pdf_backend = state.pdf.name(),
        "Billsend HTTP server starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BillsendError::Config(format!("Server error: {}", e)))?;

    state.autosave.flush().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
