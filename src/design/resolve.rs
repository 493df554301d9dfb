//! Override resolution: template defaults ⊕ sparse user patch.
//!
//! The merge destructures the partial structs without `..`, so adding a token
//! or a section flag is a compile error here until it is merged.

use super::tokens::{PartialSectionVisibility, PartialStyleTokens, SectionVisibility, StyleTokens};
use super::{DesignOverrides, ResolvedStyle, Template};

/// Resolve a template and optional overrides into a complete style.
///
/// The `template` argument is the source of truth; `overrides.template_id`
/// is ignored even if it names another template. Callers pick the template.
pub fn resolve(template: &Template, overrides: Option<&DesignOverrides>) -> ResolvedStyle {
    let (tokens, visibility) = match overrides {
        Some(o) => (
            merge_tokens(&template.default_tokens, &o.tokens),
            merge_visibility(&template.default_visibility, &o.visibility),
        ),
        None => (
            template.default_tokens.clone(),
            template.default_visibility,
        ),
    };

    ResolvedStyle {
        template_id: template.id.clone(),
        tokens,
        visibility,
    }
}

/// Field-by-field token merge. Set fields in `patch` win.
pub fn merge_tokens(base: &StyleTokens, patch: &PartialStyleTokens) -> StyleTokens {
    let PartialStyleTokens {
        font_family,
        base_text_size,
        accent_color_hex,
        spacing_scale,
        border_style,
        logo_position,
        page_size,
    } = patch;

    StyleTokens {
        font_family: font_family.unwrap_or(base.font_family),
        base_text_size: base_text_size.unwrap_or(base.base_text_size),
        accent_color_hex: accent_color_hex
            .clone()
            .unwrap_or_else(|| base.accent_color_hex.clone()),
        spacing_scale: spacing_scale.unwrap_or(base.spacing_scale),
        border_style: border_style.unwrap_or(base.border_style),
        logo_position: logo_position.unwrap_or(base.logo_position),
        page_size: page_size.unwrap_or(base.page_size),
    }
}

/// Field-by-field visibility merge. Set flags in `patch` win.
pub fn merge_visibility(
    base: &SectionVisibility,
    patch: &PartialSectionVisibility,
) -> SectionVisibility {
    let PartialSectionVisibility {
        company_details,
        client_details,
        notes,
        terms,
        payment_details,
        tax_row,
        discount_row,
        footer,
    } = *patch;

    SectionVisibility {
        company_details: company_details.unwrap_or(base.company_details),
        client_details: client_details.unwrap_or(base.client_details),
        notes: notes.unwrap_or(base.notes),
        terms: terms.unwrap_or(base.terms),
        payment_details: payment_details.unwrap_or(base.payment_details),
        tax_row: tax_row.unwrap_or(base.tax_row),
        discount_row: discount_row.unwrap_or(base.discount_row),
        footer: footer.unwrap_or(base.footer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::presets;
    use crate::design::tokens::*;
    use pretty_assertions::assert_eq;

    fn full_patch() -> PartialStyleTokens {
        PartialStyleTokens {
            font_family: Some(FontFamily::Geist),
            base_text_size: Some(BaseTextSize::Lg),
            accent_color_hex: HexColor::parse("#ff0000"),
            spacing_scale: Some(SpacingScale::Compact),
            border_style: Some(BorderStyle::None),
            logo_position: Some(LogoPosition::Top),
            page_size: Some(PageSize::Letter),
        }
    }

    #[test]
    fn test_no_overrides_returns_defaults() {
        for template in presets::list() {
            let style = resolve(template, None);
            assert_eq!(style.tokens, template.default_tokens);
            assert_eq!(style.visibility, template.default_visibility);
            assert_eq!(style.template_id, template.id);
        }
    }

    #[test]
    fn test_empty_overrides_equal_no_overrides() {
        for template in presets::list() {
            let empty = DesignOverrides::for_template(&template.id);
            assert_eq!(resolve(template, Some(&empty)), resolve(template, None));
        }
    }

    #[test]
    fn test_full_patch_replaces_every_token() {
        let template = presets::by_id_or_default("classic");
        let overrides = DesignOverrides {
            template_id: "classic".into(),
            tokens: full_patch(),
            ..Default::default()
        };
        let style = resolve(template, Some(&overrides));
        assert_eq!(style.tokens.font_family, FontFamily::Geist);
        assert_eq!(style.tokens.base_text_size, BaseTextSize::Lg);
        assert_eq!(style.tokens.accent_color_hex.as_str(), "#ff0000");
        assert_eq!(style.tokens.spacing_scale, SpacingScale::Compact);
        assert_eq!(style.tokens.border_style, BorderStyle::None);
        assert_eq!(style.tokens.logo_position, LogoPosition::Top);
        assert_eq!(style.tokens.page_size, PageSize::Letter);
    }

    #[test]
    fn test_single_field_precedence() {
        let template = presets::by_id_or_default("modern");
        let overrides = DesignOverrides {
            template_id: "modern".into(),
            tokens: PartialStyleTokens {
                page_size: Some(PageSize::Letter),
                ..Default::default()
            },
            ..Default::default()
        };
        let style = resolve(template, Some(&overrides));
        assert_eq!(style.tokens.page_size, PageSize::Letter);
        assert_eq!(style.tokens.font_family, template.default_tokens.font_family);
        assert_eq!(
            style.tokens.accent_color_hex,
            template.default_tokens.accent_color_hex
        );
        assert_eq!(style.visibility, template.default_visibility);
    }

    #[test]
    fn test_visibility_merge_per_flag() {
        let template = presets::by_id_or_default("classic");
        let mut visibility = PartialSectionVisibility::default();
        *visibility.slot_mut(Section::Notes) = Some(false);
        let overrides = DesignOverrides {
            template_id: "classic".into(),
            visibility,
            ..Default::default()
        };
        let style = resolve(template, Some(&overrides));
        for section in Section::ALL {
            let expected = section != Section::Notes;
            assert_eq!(style.visibility.get(section), expected, "{section:?}");
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let template = presets::by_id_or_default("minimal");
        let overrides = DesignOverrides {
            template_id: "minimal".into(),
            tokens: full_patch(),
            ..Default::default()
        };
        let a = serde_json::to_vec(&resolve(template, Some(&overrides))).unwrap();
        let b = serde_json::to_vec(&resolve(template, Some(&overrides))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_override_template_id_is_ignored() {
        let classic = presets::by_id_or_default("classic");
        let overrides = DesignOverrides::for_template("modern");
        let style = resolve(classic, Some(&overrides));
        assert_eq!(style.template_id, "classic");
        assert_eq!(style.tokens, classic.default_tokens);
    }

    #[test]
    fn test_malformed_wire_overrides_fall_back() {
        let template = presets::by_id_or_default("classic");
        let json = r##"{
            "templateId": "classic",
            "tokens": {"accentColorHex": "#ff0000", "borderStyle": "dotted"},
            "visibility": {"footer": "nope"}
        }"##;
        let overrides: DesignOverrides = serde_json::from_str(json).unwrap();
        let style = resolve(template, Some(&overrides));
        assert_eq!(style.tokens.accent_color_hex.as_str(), "#ff0000");
        assert_eq!(style.tokens.border_style, BorderStyle::Strong);
        assert!(style.visibility.footer);
    }
}
