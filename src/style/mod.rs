//! # Style Mapping
//!
//! Turns a [`ResolvedStyle`](crate::design::ResolvedStyle) into concrete
//! presentation values for a rendering target.
//!
//! | Target | Mapper | Units |
//! |--------|--------|-------|
//! | Interactive preview, print view | [`HtmlStyle`] | CSS px / mm |
//! | PDF | [`PdfStyle`] | PDF points |
//!
//! Both mappers share the [`SizeRole`] vocabulary and the border/spacing
//! switches below, so the three outputs agree on what "strong border" or
//! "compact spacing" means.

pub mod html;
pub mod pdf;

pub use html::HtmlStyle;
pub use pdf::PdfStyle;

use crate::design::{BorderStyle, PageSize};

/// Semantic text roles with their own size in every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeRole {
    /// Logo height when the logo sits on its own row.
    LogoTop,
    /// Logo height when the logo sits beside the company block.
    LogoSide,
    InvoiceHeading,
    SectionHeader,
    Body,
    TableHeader,
    TableRow,
    Total,
    Footer,
}

impl SizeRole {
    pub const ALL: [SizeRole; 9] = [
        SizeRole::LogoTop,
        SizeRole::LogoSide,
        SizeRole::InvoiceHeading,
        SizeRole::SectionHeader,
        SizeRole::Body,
        SizeRole::TableHeader,
        SizeRole::TableRow,
        SizeRole::Total,
        SizeRole::Footer,
    ];

    fn index(self) -> usize {
        match self {
            SizeRole::LogoTop => 0,
            SizeRole::LogoSide => 1,
            SizeRole::InvoiceHeading => 2,
            SizeRole::SectionHeader => 3,
            SizeRole::Body => 4,
            SizeRole::TableHeader => 5,
            SizeRole::TableRow => 6,
            SizeRole::Total => 7,
            SizeRole::Footer => 8,
        }
    }
}

/// Border width in target units: none → 0, subtle → 1, strong → 2.
pub fn border_units(style: BorderStyle) -> u8 {
    match style {
        BorderStyle::None => 0,
        BorderStyle::Subtle => 1,
        BorderStyle::Strong => 2,
    }
}

/// Border color; lighter as the style weakens. `None` draws nothing.
pub fn border_color_hex(style: BorderStyle) -> Option<&'static str> {
    match style {
        BorderStyle::None => None,
        BorderStyle::Subtle => Some("#e5e7eb"),
        BorderStyle::Strong => Some("#9ca3af"),
    }
}

/// Page dimensions in millimetres (width, height).
pub fn page_mm(size: PageSize) -> (f32, f32) {
    match size {
        PageSize::A4 => (210.0, 297.0),
        PageSize::Letter => (215.9, 279.4),
    }
}

/// Page margin shared by the print view and the PDF.
pub const PAGE_MARGIN_MM: f32 = 16.0;

/// Muted text color for secondary lines (addresses, labels).
pub const MUTED_TEXT_HEX: &str = "#6b7280";

/// Primary text color.
pub const TEXT_HEX: &str = "#111827";
