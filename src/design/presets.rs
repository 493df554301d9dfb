//! # Preset Templates
//!
//! Built-in templates compiled into the binary.
//!
//! | id | font | size | accent | spacing | border | logo | page |
//! |----|------|------|--------|---------|--------|------|------|
//! | classic | system | md | `#1e40af` | comfortable | strong | left | A4 |
//! | modern | inter | md | `#0f766e` | comfortable | subtle | right | A4 |
//! | minimal | geist | sm | `#111827` | compact | none | top | Letter |
//!
//! Lookups never fail: an unknown id resolves to [`DEFAULT_TEMPLATE_ID`].

use std::sync::LazyLock;

use super::Template;
use super::tokens::*;

/// Template used when an id is unknown.
pub const DEFAULT_TEMPLATE_ID: &str = "classic";

static PRESETS: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        Template {
            id: "classic".into(),
            name: "Classic".into(),
            description: "Navy accents, strong rules, logo beside the company block".into(),
            default_tokens: StyleTokens {
                font_family: FontFamily::System,
                base_text_size: BaseTextSize::Md,
                accent_color_hex: HexColor("#1e40af".into()),
                spacing_scale: SpacingScale::Comfortable,
                border_style: BorderStyle::Strong,
                logo_position: LogoPosition::Left,
                page_size: PageSize::A4,
            },
            default_visibility: SectionVisibility::ALL,
        },
        Template {
            id: "modern".into(),
            name: "Modern".into(),
            description: "Teal accents, light rules, logo on the right".into(),
            default_tokens: StyleTokens {
                font_family: FontFamily::Inter,
                base_text_size: BaseTextSize::Md,
                accent_color_hex: HexColor("#0f766e".into()),
                spacing_scale: SpacingScale::Comfortable,
                border_style: BorderStyle::Subtle,
                logo_position: LogoPosition::Right,
                page_size: PageSize::A4,
            },
            default_visibility: SectionVisibility::ALL,
        },
        Template {
            id: "minimal".into(),
            name: "Minimal".into(),
            description: "Small type, no rules, logo on top".into(),
            default_tokens: StyleTokens {
                font_family: FontFamily::Geist,
                base_text_size: BaseTextSize::Sm,
                accent_color_hex: HexColor("#111827".into()),
                spacing_scale: SpacingScale::Compact,
                border_style: BorderStyle::None,
                logo_position: LogoPosition::Top,
                page_size: PageSize::Letter,
            },
            default_visibility: SectionVisibility {
                terms: false,
                footer: false,
                ..SectionVisibility::ALL
            },
        },
    ]
});

/// All preset templates, in display order.
pub fn list() -> &'static [Template] {
    &PRESETS
}

/// Preset ids, in display order.
pub fn list_ids() -> Vec<&'static str> {
    PRESETS.iter().map(|t| t.id.as_str()).collect()
}

/// Look up a preset by id.
pub fn by_id(id: &str) -> Option<&'static Template> {
    PRESETS.iter().find(|t| t.id == id)
}

/// Look up a preset by id, falling back to the default template.
pub fn by_id_or_default(id: &str) -> &'static Template {
    by_id(id).unwrap_or_else(default_template)
}

/// The fallback template.
pub fn default_template() -> &'static Template {
    // The default id is one of the literals above.
    &PRESETS[0]
}

/// Check if an id names a preset.
pub fn is_preset(id: &str) -> bool {
    by_id(id).is_some()
}
