//! # Document Plan
//!
//! The single layout description every renderer interprets.
//!
//! ```text
//! Invoice + Organization + ResolvedStyle
//!         │
//!         ▼
//!   DocumentPlan::build   (visibility applied, money/dates formatted)
//!         │
//!   ┌─────┼──────────────┐
//!   ▼     ▼              ▼
//! preview print view    PDF
//! ```
//!
//! Section order is fixed: Header → [ClientDetails] → LineItems → Summary →
//! [Notes] → [Terms] → [PaymentDetails] → [Footer]. Bracketed sections are
//! dropped here when hidden, so backends never look at visibility flags.

use rust_decimal::Decimal;

use crate::design::{ResolvedStyle, Section};
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization, Totals, format_long_date, format_money};

/// Closing line used when the organization has none.
pub const DEFAULT_FOOTER: &str = "Thank you for your business.";

/// Column headings of the line-item table.
pub const ITEM_COLUMNS: [&str; 4] = ["Description", "Qty", "Unit price", "Amount"];

/// An ordered, fully formatted invoice layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub style: ResolvedStyle,
    pub blocks: Vec<Block>,
    /// The amounts the summary block was formatted from.
    pub totals: Totals,
}

/// One document section.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Header(HeaderBlock),
    ClientDetails(ClientBlock),
    LineItems(LineItemsBlock),
    Summary(SummaryBlock),
    Notes(TextBlock),
    Terms(TextBlock),
    PaymentDetails(TextBlock),
    Footer(TextBlock),
}

impl Block {
    /// Stable name, used as a CSS class suffix and in tests.
    pub fn name(&self) -> &'static str {
        match self {
            Block::Header(_) => "header",
            Block::ClientDetails(_) => "client-details",
            Block::LineItems(_) => "line-items",
            Block::Summary(_) => "summary",
            Block::Notes(_) => "notes",
            Block::Terms(_) => "terms",
            Block::PaymentDetails(_) => "payment-details",
            Block::Footer(_) => "footer",
        }
    }

    /// The visibility flag that controls this block, if any.
    pub fn section(&self) -> Option<Section> {
        match self {
            Block::Header(_) => Some(Section::CompanyDetails),
            Block::ClientDetails(_) => Some(Section::ClientDetails),
            Block::LineItems(_) | Block::Summary(_) => None,
            Block::Notes(_) => Some(Section::Notes),
            Block::Terms(_) => Some(Section::Terms),
            Block::PaymentDetails(_) => Some(Section::PaymentDetails),
            Block::Footer(_) => Some(Section::Footer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    pub company_name: String,
    /// Address and contact lines; empty when company details are hidden.
    pub company_lines: Vec<String>,
    pub logo_url: Option<String>,
    pub title: String,
    /// `(label, value)` pairs: number, issue date, due date.
    pub meta: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientBlock {
    pub heading: String,
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemsBlock {
    pub columns: [String; 4],
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Subtotal,
    Discount,
    Tax,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub kind: SummaryKind,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBlock {
    pub rows: Vec<SummaryRow>,
}

impl SummaryBlock {
    pub fn row(&self, kind: SummaryKind) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub heading: Option<String>,
    pub body: String,
}

impl DocumentPlan {
    /// Lay out an invoice under a resolved style.
    ///
    /// Fails only when the invoice's amounts are out of range.
    pub fn build(
        invoice: &Invoice,
        organization: &Organization,
        style: &ResolvedStyle,
    ) -> Result<Self, BillsendError> {
        let visibility = style.visibility;
        let totals = invoice.totals()?;
        let money = |amount: Decimal| format_money(&invoice.currency, amount);

        let mut blocks = Vec::new();

        let company_lines = if visibility.company_details {
            [
                organization.address.clone(),
                organization.email.clone(),
                organization.phone.clone(),
                organization.tax_id.as_ref().map(|id| format!("Tax ID: {}", id)),
            ]
            .into_iter()
            .flatten()
            .flat_map(|s| split_lines(&s))
            .collect()
        } else {
            Vec::new()
        };

        blocks.push(Block::Header(HeaderBlock {
            company_name: organization.name.clone(),
            company_lines,
            logo_url: organization.logo_url.clone().filter(|u| !u.trim().is_empty()),
            title: "Invoice".to_string(),
            meta: vec![
                ("Invoice number".to_string(), invoice.number.clone()),
                ("Issue date".to_string(), format_long_date(invoice.issue_date)),
                ("Due date".to_string(), format_long_date(invoice.due_date)),
            ],
        }));

        if visibility.client_details {
            let client = &invoice.client;
            blocks.push(Block::ClientDetails(ClientBlock {
                heading: "Bill to".to_string(),
                name: client.name.clone(),
                lines: [client.address.clone(), client.email.clone()]
                    .into_iter()
                    .flatten()
                    .flat_map(|s| split_lines(&s))
                    .collect(),
            }));
        }

        blocks.push(Block::LineItems(LineItemsBlock {
            columns: ITEM_COLUMNS.map(String::from),
            rows: invoice
                .items
                .iter()
                .map(|item| -> Result<ItemRow, BillsendError> {
                    Ok(ItemRow {
                        description: item.description.clone(),
                        quantity: item.quantity.normalize().to_string(),
                        unit_price: money(item.unit_price),
                        amount: money(item.amount()?),
                    })
                })
                .collect::<Result<_, _>>()?,
        }));

        let mut rows = vec![SummaryRow {
            kind: SummaryKind::Subtotal,
            label: "Subtotal".to_string(),
            value: money(totals.subtotal),
        }];
        if visibility.discount_row && totals.discount > Decimal::ZERO {
            rows.push(SummaryRow {
                kind: SummaryKind::Discount,
                label: format!("Discount ({}%)", invoice.discount_rate.normalize()),
                value: money(-totals.discount),
            });
        }
        // A zero tax line says nothing, so the flag alone is not enough.
        if visibility.tax_row && totals.tax > Decimal::ZERO {
            rows.push(SummaryRow {
                kind: SummaryKind::Tax,
                label: format!("Tax ({}%)", invoice.tax_rate.normalize()),
                value: money(totals.tax),
            });
        }
        rows.push(SummaryRow {
            kind: SummaryKind::Total,
            label: "Total".to_string(),
            value: money(totals.total),
        });
        blocks.push(Block::Summary(SummaryBlock { rows }));

        let optional_text = [
            (visibility.notes, "Notes", &invoice.notes, Block::Notes as fn(TextBlock) -> Block),
            (visibility.terms, "Terms", &invoice.terms, Block::Terms),
            (
                visibility.payment_details,
                "Payment details",
                &invoice.payment_details,
                Block::PaymentDetails,
            ),
        ];
        for (visible, heading, body, wrap) in optional_text {
            let Some(body) = body.as_deref().map(str::trim).filter(|b| !b.is_empty()) else {
                continue;
            };
            if visible {
                blocks.push(wrap(TextBlock {
                    heading: Some(heading.to_string()),
                    body: body.to_string(),
                }));
            }
        }

        if visibility.footer {
            let body = organization
                .footer_text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_FOOTER);
            blocks.push(Block::Footer(TextBlock {
                heading: None,
                body: body.to_string(),
            }));
        }

        Ok(Self {
            style: style.clone(),
            blocks,
            totals,
        })
    }

    /// Block names in order.
    pub fn block_names(&self) -> Vec<&'static str> {
        self.blocks.iter().map(Block::name).collect()
    }

    pub fn summary(&self) -> Option<&SummaryBlock> {
        self.blocks.iter().find_map(|b| match b {
            Block::Summary(s) => Some(s),
            _ => None,
        })
    }
}

fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
