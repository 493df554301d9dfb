//! # Design Storage
//!
//! Organization-scoped access to invoices and custom templates, plus the
//! two operations that tie a design to an invoice's history:
//!
//! - [`snapshot_design`]: freeze a resolved style onto an invoice when it is
//!   sent or printed
//! - [`rendering_style`]: the style an invoice should be drawn with, which is
//!   its snapshot if it has one and the current template otherwise
//!
//! Template lookup goes custom → preset. Rendering falls back to the default
//! preset for unknown ids; the API surfaces them as `NotFound`.

pub mod memory;

pub use memory::{MemoryRepository, Seed};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::design::{
    DesignOverrides, DesignSnapshot, ResolvedStyle, SectionVisibility, StyleTokens, Template,
    presets, resolve,
};
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization};

/// Prefix of organization-owned template ids.
pub const CUSTOM_TEMPLATE_PREFIX: &str = "custom-";

/// Persistence boundary. Every call is scoped to one organization; records
/// owned by another organization are reported as `NotFound`.
#[async_trait]
pub trait DesignRepository: Send + Sync {
    async fn organization(&self, organization_id: &str) -> Result<Organization, BillsendError>;

    async fn invoice(&self, organization_id: &str, invoice_id: &str) -> Result<Invoice, BillsendError>;

    async fn custom_templates(&self, organization_id: &str) -> Result<Vec<Template>, BillsendError>;

    async fn insert_template(&self, organization_id: &str, template: Template) -> Result<(), BillsendError>;

    /// Replace an existing custom template with the same id.
    async fn replace_template(&self, organization_id: &str, template: Template) -> Result<(), BillsendError>;

    /// Store `snapshot` on the invoice in a single update, overwriting any
    /// previous one.
    async fn set_snapshot(
        &self,
        organization_id: &str,
        invoice_id: &str,
        snapshot: DesignSnapshot,
    ) -> Result<(), BillsendError>;
}

/// Body for creating or updating a custom template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub default_tokens: StyleTokens,
    pub default_visibility: SectionVisibility,
}

impl TemplateDraft {
    fn into_template(self, id: String) -> Result<Template, BillsendError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BillsendError::InvalidInput("template name is required".into()));
        }
        Ok(Template {
            id,
            name: name.to_string(),
            description: self.description,
            default_tokens: self.default_tokens,
            default_visibility: self.default_visibility,
        })
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Presets followed by the organization's custom templates.
pub async fn list_templates(
    repo: &dyn DesignRepository,
    organization_id: &str,
) -> Result<Vec<Template>, BillsendError> {
    let mut templates = presets::list().to_vec();
    templates.extend(repo.custom_templates(organization_id).await?);
    Ok(templates)
}

/// Look up a template by id: custom first, then presets.
pub async fn find_template(
    repo: &dyn DesignRepository,
    organization_id: &str,
    template_id: &str,
) -> Result<Option<Template>, BillsendError> {
    let custom = repo
        .custom_templates(organization_id)
        .await?
        .into_iter()
        .find(|t| t.id == template_id);
    Ok(custom.or_else(|| presets::by_id(template_id).cloned()))
}

/// Like [`find_template`], but unknown ids resolve to the default preset.
pub async fn template_for_render(
    repo: &dyn DesignRepository,
    organization_id: &str,
    template_id: &str,
) -> Result<Template, BillsendError> {
    match find_template(repo, organization_id, template_id).await? {
        Some(template) => Ok(template),
        None => {
            debug!(template_id, "Unknown template, using default");
            Ok(presets::default_template().clone())
        }
    }
}

pub async fn create_template(
    repo: &dyn DesignRepository,
    organization_id: &str,
    draft: TemplateDraft,
) -> Result<Template, BillsendError> {
    let id = format!("{}{}", CUSTOM_TEMPLATE_PREFIX, uuid::Uuid::new_v4());
    let template = draft.into_template(id)?;
    repo.insert_template(organization_id, template.clone()).await?;
    info!(organization_id, template_id = %template.id, "Created template");
    Ok(template)
}

/// Replace a custom template's defaults. Presets cannot be updated.
pub async fn update_template(
    repo: &dyn DesignRepository,
    organization_id: &str,
    template_id: &str,
    draft: TemplateDraft,
) -> Result<Template, BillsendError> {
    if presets::is_preset(template_id) {
        return Err(BillsendError::NotFound(format!(
            "custom template {} (presets are read-only)",
            template_id
        )));
    }
    let template = draft.into_template(template_id.to_string())?;
    repo.replace_template(organization_id, template.clone()).await?;
    info!(organization_id, template_id, "Updated template");
    Ok(template)
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Freeze `style` onto an invoice. Repeated calls overwrite; the last one wins.
pub async fn snapshot_design(
    repo: &dyn DesignRepository,
    organization_id: &str,
    invoice_id: &str,
    style: &ResolvedStyle,
) -> Result<DesignSnapshot, BillsendError> {
    let snapshot = DesignSnapshot::capture(style, Utc::now());
    repo.set_snapshot(organization_id, invoice_id, snapshot.clone())
        .await?;
    info!(organization_id, invoice_id, template_id = %snapshot.template_id, "Snapshotted design");
    Ok(snapshot)
}

/// The style an invoice renders with: its snapshot, or its last template
/// resolved against current defaults.
pub async fn rendering_style(
    repo: &dyn DesignRepository,
    organization_id: &str,
    invoice: &Invoice,
) -> Result<ResolvedStyle, BillsendError> {
    if let Some(snapshot) = &invoice.design_snapshot {
        return Ok(snapshot.style());
    }
    let template = template_for_render(repo, organization_id, &invoice.template_id).await?;
    Ok(resolve(&template, None))
}

/// Resolve the invoice's template with ad-hoc overrides, ignoring any
/// snapshot. Used by the live preview and before taking a snapshot.
pub async fn resolve_for_invoice(
    repo: &dyn DesignRepository,
    organization_id: &str,
    invoice: &Invoice,
    overrides: Option<&DesignOverrides>,
) -> Result<ResolvedStyle, BillsendError> {
    let template_id = overrides
        .map(|o| o.template_id.as_str())
        .filter(|id| !id.is_empty())
        .unwrap_or(&invoice.template_id);
    let template = template_for_render(repo, organization_id, template_id).await?;
    Ok(resolve(&template, overrides))
}
