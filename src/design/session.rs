//! Editor session: the state behind one open design editor.
//!
//! A session owns the template being edited, the user's sparse overrides,
//! and which control is currently selected. Every edit re-resolves on demand
//! (previews are never debounced) and hands the new overrides to an optional
//! [`DraftAutosave`], which is where debouncing happens.
//!
//! The HTTP draft and preview handlers open a short-lived session per
//! request; the autosave writer is shared with the server.

use std::sync::Arc;

use tracing::debug;

use super::{
    BaseTextSize, BorderStyle, DesignOverrides, FontFamily, HexColor, LogoPosition, PageSize,
    ResolvedStyle, Section, SpacingScale, Template, resolve,
};
use crate::drafts::{DraftAutosave, DraftStore};
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization};
use crate::plan::DocumentPlan;
use crate::render::html::{HtmlMode, render_html};

/// One editable control: a token or a section flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignField {
    FontFamily,
    BaseTextSize,
    AccentColorHex,
    SpacingScale,
    BorderStyle,
    LogoPosition,
    PageSize,
    Section(Section),
}

impl DesignField {
    pub const TOKENS: [DesignField; 7] = [
        DesignField::FontFamily,
        DesignField::BaseTextSize,
        DesignField::AccentColorHex,
        DesignField::SpacingScale,
        DesignField::BorderStyle,
        DesignField::LogoPosition,
        DesignField::PageSize,
    ];

    /// Wire name, matching the preview's `data-design-field` attributes.
    pub fn key(self) -> &'static str {
        match self {
            DesignField::FontFamily => "fontFamily",
            DesignField::BaseTextSize => "baseTextSize",
            DesignField::AccentColorHex => "accentColorHex",
            DesignField::SpacingScale => "spacingScale",
            DesignField::BorderStyle => "borderStyle",
            DesignField::LogoPosition => "logoPosition",
            DesignField::PageSize => "pageSize",
            DesignField::Section(section) => section.key(),
        }
    }

    /// Inverse of [`key`](Self::key).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::TOKENS
            .into_iter()
            .chain(Section::ALL.into_iter().map(DesignField::Section))
            .find(|f| f.key() == key)
    }
}

/// A new value for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    FontFamily(FontFamily),
    BaseTextSize(BaseTextSize),
    AccentColorHex(HexColor),
    SpacingScale(SpacingScale),
    BorderStyle(BorderStyle),
    LogoPosition(LogoPosition),
    PageSize(PageSize),
}

impl TokenValue {
    pub fn field(&self) -> DesignField {
        match self {
            TokenValue::FontFamily(_) => DesignField::FontFamily,
            TokenValue::BaseTextSize(_) => DesignField::BaseTextSize,
            TokenValue::AccentColorHex(_) => DesignField::AccentColorHex,
            TokenValue::SpacingScale(_) => DesignField::SpacingScale,
            TokenValue::BorderStyle(_) => DesignField::BorderStyle,
            TokenValue::LogoPosition(_) => DesignField::LogoPosition,
            TokenValue::PageSize(_) => DesignField::PageSize,
        }
    }
}

pub struct EditorSession {
    invoice_id: String,
    template: Template,
    overrides: DesignOverrides,
    selected: Option<DesignField>,
    autosave: Option<Arc<DraftAutosave>>,
}

impl EditorSession {
    pub fn new(invoice_id: impl Into<String>, template: Template) -> Self {
        let overrides = DesignOverrides::for_template(template.id.clone());
        Self {
            invoice_id: invoice_id.into(),
            template,
            overrides,
            selected: None,
            autosave: None,
        }
    }

    /// Open a session and apply any saved draft for this invoice and template.
    /// A draft made against a different template is ignored.
    pub async fn restore(
        invoice_id: impl Into<String>,
        template: Template,
        drafts: &dyn DraftStore,
    ) -> Result<Self, BillsendError> {
        let mut session = Self::new(invoice_id, template);
        if let Some(draft) = drafts.load(&session.invoice_id).await? {
            if draft.template_id.is_empty() || draft.template_id == session.template.id {
                session.overrides = DesignOverrides {
                    template_id: session.template.id.clone(),
                    ..draft
                };
            } else {
                debug!(
                    invoice_id = %session.invoice_id,
                    draft_template = %draft.template_id,
                    "Ignoring draft for another template"
                );
            }
        }
        Ok(session)
    }

    /// Persist every subsequent edit through `autosave`.
    pub fn with_autosave(mut self, autosave: Arc<DraftAutosave>) -> Self {
        self.autosave = Some(autosave);
        self
    }

    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn overrides(&self) -> &DesignOverrides {
        &self.overrides
    }

    pub fn selected(&self) -> Option<DesignField> {
        self.selected
    }

    pub fn select(&mut self, field: DesignField) {
        self.selected = Some(field);
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn set_token(&mut self, value: TokenValue) {
        self.selected = Some(value.field());
        let tokens = &mut self.overrides.tokens;
        match value {
            TokenValue::FontFamily(v) => tokens.font_family = Some(v),
            TokenValue::BaseTextSize(v) => tokens.base_text_size = Some(v),
            TokenValue::AccentColorHex(v) => tokens.accent_color_hex = Some(v),
            TokenValue::SpacingScale(v) => tokens.spacing_scale = Some(v),
            TokenValue::BorderStyle(v) => tokens.border_style = Some(v),
            TokenValue::LogoPosition(v) => tokens.logo_position = Some(v),
            TokenValue::PageSize(v) => tokens.page_size = Some(v),
        }
        self.persist();
    }

    pub fn set_visibility(&mut self, section: Section, visible: bool) {
        self.selected = Some(DesignField::Section(section));
        *self.overrides.visibility.slot_mut(section) = Some(visible);
        self.persist();
    }

    /// Drop the override for one field so the template default shows again.
    pub fn clear_field(&mut self, field: DesignField) {
        let tokens = &mut self.overrides.tokens;
        match field {
            DesignField::FontFamily => tokens.font_family = None,
            DesignField::BaseTextSize => tokens.base_text_size = None,
            DesignField::AccentColorHex => tokens.accent_color_hex = None,
            DesignField::SpacingScale => tokens.spacing_scale = None,
            DesignField::BorderStyle => tokens.border_style = None,
            DesignField::LogoPosition => tokens.logo_position = None,
            DesignField::PageSize => tokens.page_size = None,
            DesignField::Section(section) => *self.overrides.visibility.slot_mut(section) = None,
        }
        self.persist();
    }

    /// Start over on another template. Overrides are relative to a template,
    /// so they are discarded.
    pub fn switch_template(&mut self, template: Template) {
        self.overrides = DesignOverrides::for_template(template.id.clone());
        self.template = template;
        self.selected = None;
        self.persist();
    }

    /// Replace every override at once, as an editor posting its whole state
    /// does. The overrides are taken relative to this session's template.
    pub fn apply(&mut self, overrides: DesignOverrides) {
        self.overrides = DesignOverrides {
            template_id: self.template.id.clone(),
            ..overrides
        };
        self.persist();
    }

    /// Discard all overrides.
    pub fn reset(&mut self) {
        self.overrides = DesignOverrides::for_template(self.template.id.clone());
        self.selected = None;
        self.persist();
    }

    pub fn resolved(&self) -> ResolvedStyle {
        resolve(&self.template, Some(&self.overrides))
    }

    /// Interactive preview markup for the current state.
    pub fn preview(
        &self,
        invoice: &Invoice,
        organization: &Organization,
    ) -> Result<String, BillsendError> {
        let plan = DocumentPlan::build(invoice, organization, &self.resolved())?;
        Ok(render_html(&plan, HtmlMode::Interactive))
    }

    /// Write any pending draft and end the session. The writer task stops
    /// only if no one else holds it.
    pub async fn close(self) {
        match self.autosave.map(Arc::try_unwrap) {
            Some(Ok(autosave)) => autosave.shutdown().await,
            Some(Err(shared)) => shared.flush().await,
            None => {}
        }
    }

    fn persist(&self) {
        if let Some(autosave) = &self.autosave {
            autosave.push(&self.invoice_id, self.overrides.clone());
        }
    }
}
