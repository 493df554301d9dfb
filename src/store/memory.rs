//! In-memory repository, optionally seeded from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use super::{CUSTOM_TEMPLATE_PREFIX, DesignRepository};
use crate::design::{DesignSnapshot, Template, presets};
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization};

/// Initial repository contents.
///
/// ```json
/// {
///   "organizations": [{"id": "org_1", "name": "Studio"}],
///   "invoices": [{"id": "inv_1", "organization_id": "org_1", ...}],
///   "templates": {"org_1": [{"id": "custom-…", "name": "Brand", ...}]}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    /// Custom templates keyed by organization id.
    #[serde(default)]
    pub templates: HashMap<String, Vec<Template>>,
}

impl Seed {
    pub async fn load(path: &Path) -> Result<Self, BillsendError> {
        let bytes = tokio::fs::read(path).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            BillsendError::InvalidInput(format!("Seed file {}: {}", path.display(), e))
        })
    }

    /// Custom templates must carry the custom prefix and be unique per
    /// organization, so none can shadow a preset or each other.
    pub fn validate(&self) -> Result<(), BillsendError> {
        for (organization_id, templates) in &self.templates {
            for (i, template) in templates.iter().enumerate() {
                if presets::is_preset(&template.id)
                    || !template.id.starts_with(CUSTOM_TEMPLATE_PREFIX)
                {
                    return Err(BillsendError::InvalidInput(format!(
                        "Seed template {} for {}: custom template ids must start with \"{}\"",
                        template.id, organization_id, CUSTOM_TEMPLATE_PREFIX
                    )));
                }
                if templates[..i].iter().any(|t| t.id == template.id) {
                    return Err(BillsendError::InvalidInput(format!(
                        "Seed template {} for {}: duplicate id",
                        template.id, organization_id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    organizations: RwLock<HashMap<String, Organization>>,
    invoices: RwLock<HashMap<String, Invoice>>,
    templates: RwLock<HashMap<String, Vec<Template>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Result<Self, BillsendError> {
        seed.validate()?;
        info!(
            organizations = seed.organizations.len(),
            invoices = seed.invoices.len(),
            "Loaded seed data"
        );
        Ok(Self {
            organizations: RwLock::new(
                seed.organizations
                    .into_iter()
                    .map(|o| (o.id.clone(), o))
                    .collect(),
            ),
            invoices: RwLock::new(seed.invoices.into_iter().map(|i| (i.id.clone(), i)).collect()),
            templates: RwLock::new(seed.templates),
        })
    }

    pub async fn insert_organization(&self, organization: Organization) {
        self.organizations
            .write()
            .await
            .insert(organization.id.clone(), organization);
    }

    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.invoices.write().await.insert(invoice.id.clone(), invoice);
    }

    /// Look up an invoice by id without an organization check.
    pub async fn find_invoice(&self, invoice_id: &str) -> Option<Invoice> {
        self.invoices.read().await.get(invoice_id).cloned()
    }
}

#[async_trait]
impl DesignRepository for MemoryRepository {
    async fn organization(&self, organization_id: &str) -> Result<Organization, BillsendError> {
        self.organizations
            .read()
            .await
            .get(organization_id)
            .cloned()
            .ok_or_else(|| BillsendError::NotFound(format!("organization {}", organization_id)))
    }

    async fn invoice(&self, organization_id: &str, invoice_id: &str) -> Result<Invoice, BillsendError> {
        self.invoices
            .read()
            .await
            .get(invoice_id)
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| BillsendError::NotFound(format!("invoice {}", invoice_id)))
    }

    async fn custom_templates(&self, organization_id: &str) -> Result<Vec<Template>, BillsendError> {
        Ok(self
            .templates
            .read()
            .await
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_template(&self, organization_id: &str, template: Template) -> Result<(), BillsendError> {
        self.templates
            .write()
            .await
            .entry(organization_id.to_string())
            .or_default()
            .push(template);
        Ok(())
    }

    async fn replace_template(&self, organization_id: &str, template: Template) -> Result<(), BillsendError> {
        let mut templates = self.templates.write().await;
        let slot = templates
            .get_mut(organization_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == template.id))
            .ok_or_else(|| BillsendError::NotFound(format!("template {}", template.id)))?;
        *slot = template;
        Ok(())
    }

    async fn set_snapshot(
        &self,
        organization_id: &str,
        invoice_id: &str,
        snapshot: DesignSnapshot,
    ) -> Result<(), BillsendError> {
        let mut invoices = self.invoices.write().await;
        let invoice = invoices
            .get_mut(invoice_id)
            .filter(|i| i.organization_id == organization_id)
            .ok_or_else(|| BillsendError::NotFound(format!("invoice {}", invoice_id)))?;
        invoice.template_id = snapshot.template_id.clone();
        invoice.design_snapshot = Some(snapshot);
        Ok(())
    }
}
