//! Template API handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::super::error::ApiError;
use super::super::state::{AppState, OrgId};
use crate::design::Template;
use crate::error::BillsendError;
use crate::store::{self, TemplateDraft};

/// Handle GET /api/templates - presets, then custom templates.
pub async fn list(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
) -> Result<Json<Vec<Template>>, ApiError> {
    Ok(Json(store::list_templates(state.repo.as_ref(), &org).await?))
}

/// Handle GET /api/templates/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
) -> Result<Json<Template>, ApiError> {
    store::find_template(state.repo.as_ref(), &org, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError(BillsendError::NotFound(format!("template {}", id))))
}

/// Handle POST /api/templates - create a custom template.
pub async fn create(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Json(body): Json<TemplateDraft>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let template = store::create_template(state.repo.as_ref(), &org, body).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Handle PUT /api/templates/:id - replace a custom template's defaults.
pub async fn update(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
    Json(body): Json<TemplateDraft>,
) -> Result<Json<Template>, ApiError> {
    Ok(Json(
        store::update_template(state.repo.as_ref(), &org, &id, body).await?,
    ))
}
