//! Style tokens and section visibility.
//!
//! The token set is closed: every field of [`StyleTokens`] and
//! [`SectionVisibility`] is required, so a value of either type is always
//! fully populated. Sparse user patches live in the `Partial*` mirrors, where
//! every field is optional and malformed wire values decode as absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize an optional field, treating anything that fails to parse as absent.
///
/// Overrides come from an editor that may be older or newer than this crate;
/// an unknown enum value or an invalid color must not poison the whole patch.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ============================================================================
// TOKEN ENUMERATIONS
// ============================================================================

/// Typeface family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    System,
    Geist,
    Inter,
}

/// Base text size; drives the per-role size tables in `style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseTextSize {
    Sm,
    Md,
    Lg,
}

impl BaseTextSize {
    pub const ALL: [BaseTextSize; 3] = [BaseTextSize::Sm, BaseTextSize::Md, BaseTextSize::Lg];
}

/// Vertical gap between document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingScale {
    Compact,
    Comfortable,
}

/// Separator and card border weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    None,
    Subtle,
    Strong,
}

/// Header layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoPosition {
    Left,
    Right,
    Top,
}

/// Physical page size for print and PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
}

// ============================================================================
// HEX COLOR
// ============================================================================

/// A `#rgb` or `#rrggbb` color string.
///
/// The original spelling is kept verbatim; renderers receive exactly what
/// the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub(super) String);

impl HexColor {
    /// Parse a hex color, returning `None` for anything that isn't `#` followed
    /// by 3 or 6 hex digits.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?;
        let valid_len = digits.len() == 3 || digits.len() == 6;
        if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand to `(r, g, b)` bytes. `#abc` is read as `#aabbcc`.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let digits = &self.0[1..];
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        if digits.len() == 3 {
            let expand = |i: usize| {
                let c = &digits[i..i + 1];
                channel(&format!("{c}{c}"))
            };
            (expand(0), expand(1), expand(2))
        } else {
            (
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
            )
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// COMPLETE TOKEN SETS
// ============================================================================

/// The closed set of stylistic parameters for a rendered invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTokens {
    pub font_family: FontFamily,
    pub base_text_size: BaseTextSize,
    pub accent_color_hex: HexColor,
    pub spacing_scale: SpacingScale,
    pub border_style: BorderStyle,
    pub logo_position: LogoPosition,
    pub page_size: PageSize,
}

/// Independent on/off flags for optional document regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionVisibility {
    pub company_details: bool,
    pub client_details: bool,
    pub notes: bool,
    pub terms: bool,
    pub payment_details: bool,
    pub tax_row: bool,
    pub discount_row: bool,
    pub footer: bool,
}

impl SectionVisibility {
    /// Every section shown.
    pub const ALL: Self = Self {
        company_details: true,
        client_details: true,
        notes: true,
        terms: true,
        payment_details: true,
        tax_row: true,
        discount_row: true,
        footer: true,
    };

    /// Read one flag by section name.
    pub fn get(&self, section: Section) -> bool {
        match section {
            Section::CompanyDetails => self.company_details,
            Section::ClientDetails => self.client_details,
            Section::Notes => self.notes,
            Section::Terms => self.terms,
            Section::PaymentDetails => self.payment_details,
            Section::TaxRow => self.tax_row,
            Section::DiscountRow => self.discount_row,
            Section::Footer => self.footer,
        }
    }
}

/// Names of the toggleable sections, for addressing one flag at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    CompanyDetails,
    ClientDetails,
    Notes,
    Terms,
    PaymentDetails,
    TaxRow,
    DiscountRow,
    Footer,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::CompanyDetails,
        Section::ClientDetails,
        Section::Notes,
        Section::Terms,
        Section::PaymentDetails,
        Section::TaxRow,
        Section::DiscountRow,
        Section::Footer,
    ];

    /// Wire name, as used in JSON and `data-design-field` attributes.
    pub fn key(self) -> &'static str {
        match self {
            Section::CompanyDetails => "companyDetails",
            Section::ClientDetails => "clientDetails",
            Section::Notes => "notes",
            Section::Terms => "terms",
            Section::PaymentDetails => "paymentDetails",
            Section::TaxRow => "taxRow",
            Section::DiscountRow => "discountRow",
            Section::Footer => "footer",
        }
    }
}

// ============================================================================
// PARTIAL TOKEN SETS
// ============================================================================

/// Sparse patch over [`StyleTokens`]. Absent fields inherit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialStyleTokens {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub base_text_size: Option<BaseTextSize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub accent_color_hex: Option<HexColor>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub spacing_scale: Option<SpacingScale>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub logo_position: Option<LogoPosition>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
}

/// Sparse patch over [`SectionVisibility`]. Absent flags inherit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSectionVisibility {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub company_details: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub client_details: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub notes: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub terms: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tax_row: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub discount_row: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub footer: Option<bool>,
}

impl PartialSectionVisibility {
    /// Mutable slot for one section flag.
    pub fn slot_mut(&mut self, section: Section) -> &mut Option<bool> {
        match section {
            Section::CompanyDetails => &mut self.company_details,
            Section::ClientDetails => &mut self.client_details,
            Section::Notes => &mut self.notes,
            Section::Terms => &mut self.terms,
            Section::PaymentDetails => &mut self.payment_details,
            Section::TaxRow => &mut self.tax_row,
            Section::DiscountRow => &mut self.discount_row,
            Section::Footer => &mut self.footer,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PartialStyleTokens {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
