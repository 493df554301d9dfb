//! Invoice rendering, snapshot, and draft handlers.
//!
//! Preview and resolve take live overrides and ignore any snapshot. Print
//! and PDF render what the invoice would be sent with: the snapshot when
//! present, else its template's current defaults.
//!
//! Preview and draft writes go through an [`EditorSession`] opened for the
//! request, so the HTTP editor and the in-process one share their rules.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::super::error::ApiError;
use super::super::state::{AppState, OrgId};
use crate::design::session::EditorSession;
use crate::design::{DesignOverrides, DesignSnapshot, ResolvedStyle};
use crate::error::BillsendError;
use crate::invoice::Invoice;
use crate::invoice::format::content_disposition;
use crate::plan::DocumentPlan;
use crate::render::html::{HtmlMode, render_html};
use crate::render::pdf::{PdfJob, render_pdf};
use crate::store;

/// An absent or empty body means "no overrides".
fn parse_overrides(body: &Bytes) -> Result<Option<DesignOverrides>, BillsendError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| BillsendError::InvalidInput(format!("Invalid overrides: {}", e)))
}

async fn live_style(
    state: &AppState,
    org: &str,
    invoice_id: &str,
    body: &Bytes,
) -> Result<(crate::invoice::Invoice, ResolvedStyle), BillsendError> {
    let overrides = parse_overrides(body)?;
    let invoice = state.repo.invoice(org, invoice_id).await?;
    let style =
        store::resolve_for_invoice(state.repo.as_ref(), org, &invoice, overrides.as_ref()).await?;
    Ok((invoice, style))
}

/// Session on the template `overrides` names, else the invoice's own.
async fn open_session(
    state: &AppState,
    org: &str,
    invoice: &Invoice,
    overrides: Option<&DesignOverrides>,
) -> Result<EditorSession, BillsendError> {
    let template_id = overrides
        .map(|o| o.template_id.as_str())
        .filter(|id| !id.is_empty())
        .unwrap_or(&invoice.template_id);
    let template = store::template_for_render(state.repo.as_ref(), org, template_id).await?;
    Ok(EditorSession::new(invoice.id.clone(), template))
}

/// Handle POST /api/invoices/:id/preview - interactive preview fragment.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Html<String>, ApiError> {
    let overrides = parse_overrides(&body)?;
    let invoice = state.repo.invoice(&org, &id).await?;
    let organization = state.repo.organization(&org).await?;
    let mut session = open_session(&state, &org, &invoice, overrides.as_ref()).await?;
    if let Some(overrides) = overrides {
        session.apply(overrides);
    }
    Ok(Html(session.preview(&invoice, &organization)?))
}

/// Handle POST /api/invoices/:id/resolve - the resolved style for live overrides.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ResolvedStyle>, ApiError> {
    let (_, style) = live_style(&state, &org, &id, &body).await?;
    Ok(Json(style))
}

/// Handle GET /api/invoices/:id/print - print-ready HTML document.
pub async fn print(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let invoice = state.repo.invoice(&org, &id).await?;
    let organization = state.repo.organization(&org).await?;
    let style = store::rendering_style(state.repo.as_ref(), &org, &invoice).await?;
    let plan = DocumentPlan::build(&invoice, &organization, &style)?;
    Ok(Html(render_html(&plan, HtmlMode::Print)))
}

/// Handle GET /api/invoices/:id/pdf
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let invoice = state.repo.invoice(&org, &id).await?;
    let organization = state.repo.organization(&org).await?;
    let style = store::rendering_style(state.repo.as_ref(), &org, &invoice).await?;
    let job = PdfJob::new(&invoice, &organization, &style)?;

    let bytes = render_pdf(state.pdf.as_ref(), &job, state.config.pdf_timeout).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&job.filename)),
        ],
        bytes,
    )
        .into_response())
}

/// Handle POST /api/invoices/:id/snapshot - freeze the design for send/print.
///
/// The caller must not mark the invoice sent unless this succeeds.
pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DesignSnapshot>, ApiError> {
    let (_, style) = live_style(&state, &org, &id, &body).await?;
    let snapshot = store::snapshot_design(state.repo.as_ref(), &org, &id, &style).await?;
    Ok(Json(snapshot))
}

/// Handle GET /api/invoices/:id/draft
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
) -> Result<Json<DesignOverrides>, ApiError> {
    state.repo.invoice(&org, &id).await?;
    state.autosave.flush().await;
    state
        .drafts
        .load(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError(BillsendError::NotFound(format!("draft for invoice {}", id))))
}

/// Handle PUT /api/invoices/:id/draft - queue a debounced draft write.
pub async fn put_draft(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
    payload: Result<Json<DesignOverrides>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(overrides) = payload.map_err(|rejection| {
        BillsendError::InvalidInput(format!("Invalid draft: {}", rejection.body_text()))
    })?;
    let invoice = state.repo.invoice(&org, &id).await?;
    let mut session = open_session(&state, &org, &invoice, Some(&overrides))
        .await?
        .with_autosave(state.autosave.clone());
    session.apply(overrides);
    Ok(StatusCode::ACCEPTED)
}

/// Handle DELETE /api/invoices/:id/draft
pub async fn delete_draft(
    State(state): State<Arc<AppState>>,
    OrgId(org): OrgId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repo.invoice(&org, &id).await?;
    // drain pending writes so a queued draft can't reappear
    state.autosave.flush().await;
    state.drafts.clear(&id).await?;
    info!(invoice_id = %id, "Cleared draft");
    Ok(StatusCode::NO_CONTENT)
}
