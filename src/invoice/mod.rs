//! # Invoice Data
//!
//! The invoice, client, and organization records the renderers read, plus
//! the arithmetic and formatting every target shares.
//!
//! Money is `rust_decimal::Decimal` end to end and is formatted exactly once
//! (in [`crate::plan`]), so the three outputs cannot disagree on a cent.

pub mod format;

pub use format::{format_long_date, format_money, kebab, pdf_filename};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::design::DesignSnapshot;
use crate::design::presets::DEFAULT_TEMPLATE_ID;
use crate::error::BillsendError;

fn default_template_id() -> String {
    DEFAULT_TEMPLATE_ID.to_string()
}

/// The issuing organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Closing line printed in the footer section.
    #[serde(default)]
    pub footer_text: Option<String>,
}

/// The billed client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// One billed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit_price`, rounded to cents.
    ///
    /// Fails when the product does not fit in a `Decimal`.
    pub fn amount(&self) -> Result<Decimal, BillsendError> {
        self.quantity
            .checked_mul(self.unit_price)
            .map(round_cents)
            .ok_or_else(|| {
                BillsendError::InvalidInput(format!(
                    "Line item \"{}\": amount out of range",
                    self.description
                ))
            })
    }
}

/// An invoice as stored, including its design snapshot once sent or printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub organization_id: String,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// ISO currency code printed as a literal prefix.
    pub currency: String,
    pub client: Client,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Tax percentage applied after discount.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Discount percentage applied to the subtotal.
    #[serde(default)]
    pub discount_rate: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub payment_details: Option<String>,
    /// Last template the invoice was edited with.
    #[serde(default = "default_template_id")]
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_snapshot: Option<DesignSnapshot>,
}

impl Invoice {
    /// Compute subtotal, discount, tax, and total.
    pub fn totals(&self) -> Result<Totals, BillsendError> {
        Totals::compute(&self.items, self.discount_rate, self.tax_rate)
    }
}

/// Invoice amounts, all rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// ```text
    /// subtotal = Σ round(qty × price)
    /// discount = round(subtotal × discount% / 100)
    /// tax      = round((subtotal − discount) × tax% / 100)
    /// total    = subtotal − discount + tax
    /// ```
    ///
    /// Every step is checked; an out-of-range result is `InvalidInput`
    /// rather than a panic.
    pub fn compute(
        items: &[LineItem],
        discount_rate: Decimal,
        tax_rate: Decimal,
    ) -> Result<Self, BillsendError> {
        let mut subtotal = Decimal::ZERO;
        for item in items {
            subtotal = subtotal.checked_add(item.amount()?).ok_or_else(overflow)?;
        }
        let discount = percent_of(subtotal, discount_rate)?;
        let taxable = subtotal.checked_sub(discount).ok_or_else(overflow)?;
        let tax = percent_of(taxable, tax_rate)?;
        Ok(Self {
            subtotal,
            discount,
            tax,
            total: taxable.checked_add(tax).ok_or_else(overflow)?,
        })
    }
}

/// `round(value × rate / 100)`.
fn percent_of(value: Decimal, rate: Decimal) -> Result<Decimal, BillsendError> {
    value
        .checked_mul(rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(round_cents)
        .ok_or_else(overflow)
}

fn overflow() -> BillsendError {
    BillsendError::InvalidInput("Invoice totals out of range".to_string())
}

/// Round half away from zero to two decimal places.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("Design", dec!(2), dec!(25.00)),
            LineItem::new("Hosting", dec!(1), dec!(12.50)),
        ]
    }

    #[test]
    fn test_totals_without_tax() {
        let totals = Totals::compute(&items(), Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, dec!(62.50));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec!(62.50));
    }

    #[test]
    fn test_totals_with_tax() {
        let totals = Totals::compute(&items(), Decimal::ZERO, dec!(20)).unwrap();
        assert_eq!(totals.tax, dec!(12.50));
        assert_eq!(totals.total, dec!(75.00));
    }

    #[test]
    fn test_discount_before_tax() {
        let totals = Totals::compute(&items(), dec!(10), dec!(20)).unwrap();
        assert_eq!(totals.discount, dec!(6.25));
        assert_eq!(totals.tax, dec!(11.25));
        assert_eq!(totals.total, dec!(67.50));
    }

    #[test]
    fn test_line_amount_rounds_half_up() {
        let item = LineItem::new("Thirds", dec!(3), dec!(0.335));
        assert_eq!(item.amount().unwrap(), dec!(1.01));
    }

    #[test]
    fn test_invoice_json_defaults() {
        let json = r#"{
            "id": "inv_1",
            "organization_id": "org_1",
            "number": "INV-0001",
            "issue_date": "2025-03-05",
            "due_date": "2025-04-04",
            "currency": "GBP",
            "client": {"name": "Acme"},
            "items": [{"description": "Work", "quantity": 1, "unit_price": "10.5"}]
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.template_id, "classic");
        assert_eq!(invoice.tax_rate, Decimal::ZERO);
        assert!(invoice.design_snapshot.is_none());
        assert_eq!(invoice.totals().unwrap().total, dec!(10.50));
    }

    #[test]
    fn test_line_amount_overflow_is_an_error() {
        let item = LineItem::new("Huge", Decimal::MAX, dec!(2));
        assert!(matches!(item.amount(), Err(BillsendError::InvalidInput(_))));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let items = vec![
            LineItem::new("Half", Decimal::MAX, dec!(0.75)),
            LineItem::new("Other half", Decimal::MAX, dec!(0.75)),
        ];
        let result = Totals::compute(&items, Decimal::ZERO, Decimal::ZERO);
        assert!(matches!(result, Err(BillsendError::InvalidInput(_))));

        let taxed = vec![LineItem::new("Near max", Decimal::MAX, Decimal::ONE)];
        let result = Totals::compute(&taxed, Decimal::ZERO, dec!(200));
        assert!(matches!(result, Err(BillsendError::InvalidInput(_))));
    }
}
