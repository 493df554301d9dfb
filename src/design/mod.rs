//! # Design Model
//!
//! Templates, user overrides, and the resolved style every renderer consumes.
//!
//! ```text
//! Template (preset or custom) ──┐
//!                               ├── resolve() ──► ResolvedStyle ──► plan / renderers
//! DesignOverrides (sparse) ─────┘
//! ```
//!
//! ```
//! use billsend::design::{self, presets, DesignOverrides, PartialStyleTokens, HexColor};
//!
//! let template = presets::by_id_or_default("classic");
//! let overrides = DesignOverrides {
//!     template_id: "classic".into(),
//!     tokens: PartialStyleTokens {
//!         accent_color_hex: HexColor::parse("#ff0000"),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//!
//! let style = design::resolve(template, Some(&overrides));
//! assert_eq!(style.tokens.accent_color_hex.as_str(), "#ff0000");
//! ```

pub mod presets;
pub mod resolve;
pub mod session;
pub mod tokens;

pub use resolve::resolve;
pub use tokens::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bundle of default tokens and default section visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub default_tokens: StyleTokens,
    pub default_visibility: SectionVisibility,
}

/// A sparse user patch on top of a template.
///
/// `template_id` records which template the user was editing; it is not
/// consulted by [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignOverrides {
    #[serde(default)]
    pub template_id: String,
    #[serde(default, skip_serializing_if = "PartialStyleTokens::is_empty")]
    pub tokens: PartialStyleTokens,
    #[serde(default, skip_serializing_if = "PartialSectionVisibility::is_empty")]
    pub visibility: PartialSectionVisibility,
}

impl DesignOverrides {
    /// Empty patch for a template.
    pub fn for_template(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.visibility.is_empty()
    }
}

/// Fully populated style: the only structure renderers accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    /// Template the defaults came from.
    pub template_id: String,
    pub tokens: StyleTokens,
    pub visibility: SectionVisibility,
}

/// Immutable copy of a resolved style attached to a sent or printed invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    pub template_id: String,
    pub tokens: StyleTokens,
    pub visibility: SectionVisibility,
    pub taken_at: DateTime<Utc>,
}

impl DesignSnapshot {
    /// Capture a resolved style at `taken_at`.
    pub fn capture(style: &ResolvedStyle, taken_at: DateTime<Utc>) -> Self {
        Self {
            template_id: style.template_id.clone(),
            tokens: style.tokens.clone(),
            visibility: style.visibility,
            taken_at,
        }
    }

    /// The style this snapshot froze.
    pub fn style(&self) -> ResolvedStyle {
        ResolvedStyle {
            template_id: self.template_id.clone(),
            tokens: self.tokens.clone(),
            visibility: self.visibility,
        }
    }
}
