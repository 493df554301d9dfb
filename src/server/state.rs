//! Server state and request extractors.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use crate::config::AppConfig;
use crate::drafts::{DraftAutosave, DraftStore};
use crate::error::BillsendError;
use crate::render::pdf::PdfBackend;
use crate::store::DesignRepository;

/// Header carrying the caller's organization id.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub repo: Arc<dyn DesignRepository>,
    pub pdf: Arc<dyn PdfBackend>,
    pub drafts: Arc<dyn DraftStore>,
    /// Debounced writer in front of `drafts`, shared by editor sessions.
    pub autosave: Arc<DraftAutosave>,
    /// Unix timestamp of server boot.
    pub boot_time: u64,
}

impl AppState {
    /// Must be called inside a tokio runtime (the autosave task is spawned here).
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn DesignRepository>,
        pdf: Arc<dyn PdfBackend>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            config,
            repo,
            pdf,
            autosave: Arc::new(DraftAutosave::spawn(drafts.clone())),
            drafts,
            boot_time,
        }
    }
}

/// The authenticated organization, from [`ORGANIZATION_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgId(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OrgId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ORGANIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| OrgId(v.to_string()))
            .ok_or_else(|| {
                ApiError(BillsendError::Unauthorized(format!(
                    "missing {} header",
                    ORGANIZATION_HEADER
                )))
            })
    }
}
