//! # Render Consistency Tests
//!
//! The three targets are independent interpreters of one document plan.
//! These tests render the same invoice to every target and check that the
//! money, dates, and visible sections agree.
//!
//! PDF text is read back by decoding page content streams with `lopdf`, so
//! the assertions see what a viewer would draw, not our layout structs.

use billsend::design::{presets, resolve, DesignOverrides, HexColor, PartialStyleTokens, ResolvedStyle};
use billsend::invoice::{Client, Invoice, LineItem, Organization};
use billsend::plan::DEFAULT_FOOTER;
use billsend::render::{render, RenderedOutput, Target};
use chrono::NaiveDate;
use lopdf::content::Content;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// FIXTURES
// ============================================================================

fn organization() -> Organization {
    Organization {
        id: "org_1".into(),
        name: "Northwind Studio".into(),
        address: Some("12 Harbour Street".into()),
        email: Some("accounts@northwind.test".into()),
        ..Default::default()
    }
}

fn invoice(items: usize) -> Invoice {
    Invoice {
        id: "inv_1".into(),
        organization_id: "org_1".into(),
        number: "INV-0007".into(),
        issue_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
        currency: "GBP".into(),
        client: Client {
            name: "Acme Ltd".into(),
            email: None,
            address: Some("1 Market Square".into()),
        },
        items: (0..items)
            .map(|i| LineItem::new(format!("Item {}", i + 1), dec!(1), dec!(12.50)))
            .collect(),
        tax_rate: Decimal::ZERO,
        discount_rate: Decimal::ZERO,
        notes: Some("Files delivered separately".into()),
        terms: Some("Net 30".into()),
        payment_details: None,
        template_id: "classic".into(),
        design_snapshot: None,
    }
}

fn style(template_id: &str, overrides: Option<DesignOverrides>) -> ResolvedStyle {
    let template = presets::by_id_or_default(template_id);
    resolve(template, overrides.as_ref())
}

fn red_classic() -> ResolvedStyle {
    style(
        "classic",
        Some(DesignOverrides {
            template_id: "classic".into(),
            tokens: PartialStyleTokens {
                accent_color_hex: HexColor::parse("#ff0000"),
                ..Default::default()
            },
            ..Default::default()
        }),
    )
}

fn html(target: Target, invoice: &Invoice, style: &ResolvedStyle) -> String {
    match render(target, invoice, &organization(), style).unwrap() {
        RenderedOutput::Html(html) => html,
        RenderedOutput::Pdf(_) => panic!("expected HTML for {}", target),
    }
}

/// What a PDF page draws: text runs with their fill color, and stroke widths.
#[derive(Debug, Default)]
struct DrawnPage {
    texts: Vec<(String, [f32; 3])>,
    stroke_widths: Vec<f32>,
}

impl DrawnPage {
    fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|(t, _)| t == needle)
    }
}

fn pdf_pages(invoice: &Invoice, style: &ResolvedStyle) -> Vec<DrawnPage> {
    let bytes = match render(Target::Pdf, invoice, &organization(), style).unwrap() {
        RenderedOutput::Pdf(bytes) => bytes,
        RenderedOutput::Html(_) => panic!("expected PDF bytes"),
    };
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            let mut page = DrawnPage::default();
            let mut fill = [0.0; 3];
            for op in content.operations {
                match op.operator.as_str() {
                    "rg" => {
                        for (slot, operand) in fill.iter_mut().zip(&op.operands) {
                            *slot = operand.as_float().unwrap();
                        }
                    }
                    "Tj" => {
                        let raw = op.operands[0].as_str().unwrap();
                        page.texts.push((String::from_utf8_lossy(raw).into_owned(), fill));
                    }
                    "w" => page.stroke_widths.push(op.operands[0].as_float().unwrap()),
                    _ => {}
                }
            }
            page
        })
        .collect()
}

fn all_texts(pages: &[DrawnPage]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.texts.iter().map(|(t, _)| t.clone()))
        .collect()
}

// ============================================================================
// CROSS-TARGET AGREEMENT
// ============================================================================

#[test]
fn test_totals_identical_across_targets() {
    let mut invoice = invoice(3);
    invoice.tax_rate = dec!(20);
    invoice.discount_rate = dec!(10);
    let style = style("classic", None);

    // subtotal 37.50, discount 3.75, tax 6.75, total 40.50
    let expected = ["GBP 37.50", "GBP -3.75", "GBP 6.75", "GBP 40.50"];

    let interactive = html(Target::Interactive, &invoice, &style);
    let print = html(Target::Print, &invoice, &style);
    let pdf = all_texts(&pdf_pages(&invoice, &style));

    for value in expected {
        assert!(interactive.contains(value), "interactive missing {}", value);
        assert!(print.contains(value), "print missing {}", value);
        assert!(pdf.iter().any(|t| t == value), "pdf missing {}", value);
    }
}

#[test]
fn test_dates_identical_across_targets() {
    let invoice = invoice(1);
    let style = style("modern", None);

    let interactive = html(Target::Interactive, &invoice, &style);
    let print = html(Target::Print, &invoice, &style);
    let pdf = pdf_pages(&invoice, &style);

    for date in ["5 March 2025", "4 April 2025"] {
        assert!(interactive.contains(date));
        assert!(print.contains(date));
        assert!(pdf[0].has_text(date), "pdf missing {}", date);
    }
}

#[test]
fn test_hidden_sections_absent_everywhere() {
    let invoice = invoice(1);
    let mut overrides = DesignOverrides::for_template("classic");
    overrides.visibility.notes = Some(false);
    overrides.visibility.terms = Some(false);
    let style = style("classic", Some(overrides));

    let interactive = html(Target::Interactive, &invoice, &style);
    let print = html(Target::Print, &invoice, &style);
    let pdf = all_texts(&pdf_pages(&invoice, &style));

    for text in ["Files delivered separately", "Net 30"] {
        assert!(!interactive.contains(text));
        assert!(!print.contains(text));
        assert!(!pdf.iter().any(|t| t.contains(text)));
    }
}

// ============================================================================
// DOCUMENTED EXAMPLES
// ============================================================================

#[test]
fn test_red_accent_over_classic() {
    let style = red_classic();
    assert_eq!(style.tokens.accent_color_hex.as_str(), "#ff0000");
    assert_eq!(
        style.tokens.border_style,
        presets::by_id_or_default("classic").default_tokens.border_style
    );

    let invoice = invoice(2);

    for target in [Target::Interactive, Target::Print] {
        let out = html(target, &invoice, &style);
        assert!(out.contains("color: #ff0000"), "{} heading not red", target);
        assert!(out.contains("2px solid #9ca3af"), "{} borders not strong", target);
    }

    let pages = pdf_pages(&invoice, &style);
    let heading = pages[0]
        .texts
        .iter()
        .find(|(t, _)| t == "Invoice")
        .expect("heading drawn");
    assert_eq!(heading.1, [1.0, 0.0, 0.0]);
    assert!(pages[0].stroke_widths.iter().all(|&w| w == 2.0));
    assert!(!pages[0].stroke_widths.is_empty());
}

#[test]
fn test_tax_row_follows_amount() {
    let style = style("classic", None);

    let untaxed = invoice(1);
    for target in [Target::Interactive, Target::Print] {
        assert!(!html(target, &untaxed, &style).contains("Tax ("));
    }
    assert!(!all_texts(&pdf_pages(&untaxed, &style))
        .iter()
        .any(|t| t.starts_with("Tax")));

    // 5 × 12.50 = 62.50 at 20% → 12.50
    let mut taxed = invoice(5);
    taxed.tax_rate = dec!(20);
    for target in [Target::Interactive, Target::Print] {
        let out = html(target, &taxed, &style);
        assert!(out.contains("Tax (20%)"));
        assert!(out.contains("GBP 12.50"));
    }
    let pdf = all_texts(&pdf_pages(&taxed, &style));
    assert!(pdf.iter().any(|t| t.starts_with("Tax")));
}

// ============================================================================
// PAGINATION
// ============================================================================

#[test]
fn test_long_invoice_paginates_with_all_items() {
    let invoice = invoice(120);
    let style = style("classic", None);
    let pages = pdf_pages(&invoice, &style);

    assert!(pages.len() > 1, "expected several pages, got {}", pages.len());

    let texts = all_texts(&pages);
    for i in 1..=120 {
        let item = format!("Item {}", i);
        assert_eq!(texts.iter().filter(|t| **t == item).count(), 1, "{}", item);
    }
    // subtotal and total
    assert_eq!(texts.iter().filter(|t| *t == "GBP 1500.00").count(), 2);

    let last = pages.last().unwrap();
    assert!(last.has_text(DEFAULT_FOOTER));
    assert!(!pages[..pages.len() - 1].iter().any(|p| p.has_text(DEFAULT_FOOTER)));
}

#[test]
fn test_short_invoice_is_one_page() {
    let pages = pdf_pages(&invoice(3), &style("minimal", None));
    assert_eq!(pages.len(), 1);
}

#[test]
fn test_print_page_rule_matches_page_size() {
    let invoice = invoice(1);
    assert!(html(Target::Print, &invoice, &style("classic", None)).contains("size: A4"));
    assert!(html(Target::Print, &invoice, &style("minimal", None)).contains("size: letter"));
}
