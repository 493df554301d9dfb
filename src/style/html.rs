//! Markup style mapping for the interactive preview and the print view.

use super::{PAGE_MARGIN_MM, SizeRole, border_color_hex, border_units, page_mm};
use crate::design::{BaseTextSize, FontFamily, PageSize, ResolvedStyle, SpacingScale};

/// Pixel sizes per role, columns `[sm, md, lg]`, rows in [`SizeRole::ALL`] order.
const SIZE_TABLE_PX: [[u16; 3]; 9] = [
    [48, 56, 64], // logo-top
    [40, 48, 56], // logo-side
    [24, 28, 32], // invoice heading
    [11, 12, 13], // section header
    [12, 14, 16], // body
    [11, 12, 13], // table header
    [12, 14, 15], // table row
    [15, 17, 19], // total
    [10, 11, 12], // footer
];

/// CSS pixels per millimetre at 96 DPI.
const PX_PER_MM: f32 = 96.0 / 25.4;

/// Concrete CSS values for one resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlStyle {
    pub font_stack: &'static str,
    pub base_text_size: BaseTextSize,
    pub accent: String,
    /// Gap between sections, px.
    pub section_gap_px: u16,
    /// Border width, px.
    pub border_px: u8,
    /// Border color, or `None` for no border.
    pub border_color: Option<&'static str>,
    pub page_size: PageSize,
}

impl HtmlStyle {
    /// Map a resolved style onto CSS values.
    pub fn from_resolved(style: &ResolvedStyle) -> Self {
        let tokens = &style.tokens;
        Self {
            font_stack: font_stack(tokens.font_family),
            base_text_size: tokens.base_text_size,
            accent: tokens.accent_color_hex.as_str().to_string(),
            section_gap_px: match tokens.spacing_scale {
                SpacingScale::Compact => 16,
                SpacingScale::Comfortable => 28,
            },
            border_px: border_units(tokens.border_style),
            border_color: border_color_hex(tokens.border_style),
            page_size: tokens.page_size,
        }
    }

    /// Font size (or logo height) in px for a role.
    pub fn size_px(&self, role: SizeRole) -> u16 {
        size_px(role, self.base_text_size)
    }

    /// CSS `border` shorthand, `none` when the style has no border.
    pub fn border_css(&self) -> String {
        match self.border_color {
            Some(color) if self.border_px > 0 => format!("{}px solid {}", self.border_px, color),
            _ => "none".to_string(),
        }
    }

    /// CSS `@page` size keyword.
    pub fn page_css(&self) -> &'static str {
        match self.page_size {
            PageSize::A4 => "A4",
            PageSize::Letter => "letter",
        }
    }

    /// On-screen page width in px, so the preview card has the paper's proportions.
    pub fn page_width_px(&self) -> u16 {
        let (width_mm, _) = page_mm(self.page_size);
        (width_mm * PX_PER_MM).round() as u16
    }

    /// Inner padding in px, matching the printed margin.
    pub fn page_padding_px(&self) -> u16 {
        (PAGE_MARGIN_MM * PX_PER_MM).round() as u16
    }
}

/// Size lookup independent of a mapped style.
pub fn size_px(role: SizeRole, base: BaseTextSize) -> u16 {
    let column = match base {
        BaseTextSize::Sm => 0,
        BaseTextSize::Md => 1,
        BaseTextSize::Lg => 2,
    };
    SIZE_TABLE_PX[role.index()][column]
}

/// CSS font stack for a family.
pub fn font_stack(family: FontFamily) -> &'static str {
    match family {
        FontFamily::System => {
            r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif"#
        }
        FontFamily::Geist => r#""Geist", "Geist Sans", system-ui, sans-serif"#,
        FontFamily::Inter => r#""Inter", system-ui, sans-serif"#,
    }
}
