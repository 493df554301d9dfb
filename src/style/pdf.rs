//! PDF style mapping.
//!
//! The PDF writer has no stylesheet and no intrinsic table layout, so this
//! mapper resolves everything to points up front, including the line-item
//! column widths.
//!
//! ## Page Geometry
//!
//! ```text
//! A4:     595.28 × 841.89 pt
//! Letter: 612.00 × 792.00 pt
//! margin: 16mm = 45.35 pt on every side
//! ```

use super::{PAGE_MARGIN_MM, SizeRole, border_color_hex, border_units, page_mm};
use crate::design::{BaseTextSize, PageSize, ResolvedStyle, SpacingScale};

/// Point sizes per role, columns `[sm, md, lg]`, rows in [`SizeRole::ALL`] order.
const SIZE_TABLE_PT: [[f32; 3]; 9] = [
    [36.0, 42.0, 48.0], // logo-top
    [30.0, 36.0, 42.0], // logo-side
    [18.0, 21.0, 24.0], // invoice heading
    [8.0, 9.0, 10.0],   // section header
    [9.0, 10.5, 12.0],  // body
    [8.0, 9.0, 10.0],   // table header
    [9.0, 10.5, 11.5],  // table row
    [11.0, 13.0, 14.5], // total
    [7.5, 8.0, 9.0],    // footer
];

/// Line-item column shares: description, quantity, unit price, amount.
pub const COLUMN_FRACTIONS: [f32; 4] = [0.52, 0.12, 0.18, 0.18];

const PT_PER_MM: f32 = 72.0 / 25.4;

/// An RGB color with channels in `0.0..=1.0`, as PDF operators expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn from_bytes((r, g, b): (u8, u8, u8)) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse a `#rgb`/`#rrggbb` string; invalid input maps to black.
    pub fn from_hex(hex: &str) -> Self {
        crate::design::HexColor::parse(hex)
            .map(|c| Self::from_bytes(c.rgb()))
            .unwrap_or(Self { r: 0.0, g: 0.0, b: 0.0 })
    }
}

/// Concrete PDF values for one resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStyle {
    pub base_text_size: BaseTextSize,
    pub accent: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    /// Border stroke width in pt; zero means no borders.
    pub border_width: f32,
    pub border_color: Option<Rgb>,
    pub section_gap: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl PdfStyle {
    /// Map a resolved style onto PDF values.
    pub fn from_resolved(style: &ResolvedStyle) -> Self {
        let tokens = &style.tokens;
        let (page_width, page_height) = page_points(tokens.page_size);
        Self {
            base_text_size: tokens.base_text_size,
            accent: Rgb::from_bytes(tokens.accent_color_hex.rgb()),
            text: Rgb::from_hex(super::TEXT_HEX),
            muted: Rgb::from_hex(super::MUTED_TEXT_HEX),
            border_width: border_units(tokens.border_style) as f32,
            border_color: border_color_hex(tokens.border_style).map(Rgb::from_hex),
            section_gap: match tokens.spacing_scale {
                SpacingScale::Compact => 12.0,
                SpacingScale::Comfortable => 20.0,
            },
            page_width,
            page_height,
            margin: PAGE_MARGIN_MM * PT_PER_MM,
        }
    }

    /// Font size (or logo height) in points for a role.
    pub fn size(&self, role: SizeRole) -> f32 {
        size_pt(role, self.base_text_size)
    }

    /// Usable width between the side margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Fixed line-item column widths in points, summing to the content width.
    pub fn column_widths(&self) -> [f32; 4] {
        let width = self.content_width();
        COLUMN_FRACTIONS.map(|f| f * width)
    }

    pub fn has_borders(&self) -> bool {
        self.border_width > 0.0 && self.border_color.is_some()
    }
}

/// Size lookup independent of a mapped style.
pub fn size_pt(role: SizeRole, base: BaseTextSize) -> f32 {
    let column = match base {
        BaseTextSize::Sm => 0,
        BaseTextSize::Md => 1,
        BaseTextSize::Lg => 2,
    };
    SIZE_TABLE_PT[role.index()][column]
}

/// Page dimensions in points.
pub fn page_points(size: PageSize) -> (f32, f32) {
    match size {
        PageSize::A4 => {
            let (w, h) = page_mm(size);
            (w * PT_PER_MM, h * PT_PER_MM)
        }
        PageSize::Letter => (612.0, 792.0),
    }
}
