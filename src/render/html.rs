//! # Markup Renderer
//!
//! Interprets a [`DocumentPlan`] as HTML for the two markup targets.
//!
//! | Mode | Output | Extras |
//! |------|--------|--------|
//! | [`HtmlMode::Interactive`] | `<article>` fragment with scoped `<style>` | page-width card, `data-design-field` hooks |
//! | [`HtmlMode::Print`] | complete document | `@page` size and margin, `break-inside: avoid` per section |
//!
//! Both modes emit the same blocks in the same order with the same text; only
//! the surrounding chrome differs.

use htmlize::{escape_attribute, escape_text};

use crate::design::{LogoPosition, Section};
use crate::plan::{
    Block, ClientBlock, DocumentPlan, HeaderBlock, LineItemsBlock, SummaryBlock, SummaryKind,
    TextBlock,
};
use crate::style::{HtmlStyle, SizeRole};

/// Which markup target to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlMode {
    /// Live editor preview.
    Interactive,
    /// Print-ready standalone document.
    Print,
}

/// Render a plan as HTML.
pub fn render_html(plan: &DocumentPlan, mode: HtmlMode) -> String {
    let style = HtmlStyle::from_resolved(&plan.style);
    let article = render_article(plan, &style, mode);
    match mode {
        HtmlMode::Interactive => article,
        HtmlMode::Print => {
            let title = plan
                .blocks
                .iter()
                .find_map(|b| match b {
                    Block::Header(h) => h.meta.first().map(|(_, number)| number.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            format!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
                 <title>Invoice {}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
                escape_text(&title),
                article
            )
        }
    }
}

fn render_article(plan: &DocumentPlan, style: &HtmlStyle, mode: HtmlMode) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<article class=\"bs-invoice\" data-template=\"{}\">\n",
        escape_attribute(&plan.style.template_id)
    ));
    out.push_str("<style>\n");
    out.push_str(&stylesheet(style, plan.style.tokens.logo_position, mode));
    out.push_str("</style>\n");

    for block in &plan.blocks {
        let html = match block {
            Block::Header(header) => render_header(header, plan.style.tokens.logo_position, mode),
            Block::ClientDetails(client) => render_client(client, mode),
            Block::LineItems(items) => render_items(items, mode),
            Block::Summary(summary) => render_summary(summary, mode),
            Block::Notes(text) | Block::Terms(text) | Block::PaymentDetails(text) => {
                render_text(block.name(), block.section(), text, mode)
            }
            Block::Footer(text) => render_footer(text, mode),
        };
        out.push_str(&html);
    }

    out.push_str("</article>\n");
    out
}

/// ` data-design-field="…"` in interactive mode, nothing in print.
fn field_attr(mode: HtmlMode, key: &str) -> String {
    match mode {
        HtmlMode::Interactive => format!(" data-design-field=\"{}\"", key),
        HtmlMode::Print => String::new(),
    }
}

fn section_attr(mode: HtmlMode, section: Option<Section>) -> String {
    section.map(|s| field_attr(mode, s.key())).unwrap_or_default()
}

/// Body text with line breaks preserved.
fn paragraph(text: &str) -> String {
    text.lines()
        .map(|line| escape_text(line).into_owned())
        .collect::<Vec<_>>()
        .join("<br>")
}

// ============================================================================
// STYLESHEET
// ============================================================================

fn stylesheet(style: &HtmlStyle, logo_position: LogoPosition, mode: HtmlMode) -> String {
    let px = |role: SizeRole| style.size_px(role);
    let border = style.border_css();
    let logo_height = match logo_position {
        LogoPosition::Top => px(SizeRole::LogoTop),
        LogoPosition::Left | LogoPosition::Right => px(SizeRole::LogoSide),
    };
    let brand_direction = match logo_position {
        LogoPosition::Left => "row",
        LogoPosition::Right => "row-reverse",
        LogoPosition::Top => "column",
    };

    let mut css = String::new();
    css.push_str(&format!(
        ".bs-invoice {{ font-family: {font}; font-size: {body}px; color: #111827; \
         line-height: 1.45; box-sizing: border-box; }}\n",
        font = style.font_stack,
        body = px(SizeRole::Body),
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-section {{ margin: 0 0 {}px 0; }}\n",
        style.section_gap_px
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-header {{ display: flex; justify-content: space-between; gap: 24px; }}\n\
         .bs-invoice .bs-brand {{ display: flex; flex-direction: {brand_direction}; gap: 12px; }}\n\
         .bs-invoice .bs-logo {{ height: {logo_height}px; width: auto; object-fit: contain; }}\n"
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-title {{ margin: 0; font-size: {}px; color: {}; }}\n",
        px(SizeRole::InvoiceHeading),
        style.accent
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-section-title {{ margin: 0 0 4px 0; font-size: {}px; \
         text-transform: uppercase; letter-spacing: 0.05em; color: {}; }}\n",
        px(SizeRole::SectionHeader),
        style.accent
    ));
    css.push_str(".bs-invoice .bs-company-name { font-weight: 600; }\n");
    css.push_str(".bs-invoice .bs-muted { color: #6b7280; }\n");
    css.push_str(".bs-invoice .bs-meta dl { display: grid; grid-template-columns: auto auto; gap: 2px 12px; margin: 8px 0 0 0; }\n");
    css.push_str(".bs-invoice .bs-meta dt { color: #6b7280; }\n");
    css.push_str(".bs-invoice .bs-meta dd { margin: 0; text-align: right; }\n");
    css.push_str(&format!(
        ".bs-invoice table {{ width: 100%; border-collapse: collapse; }}\n\
         .bs-invoice .bs-items th {{ font-size: {th}px; color: {accent}; text-align: left; \
         border-bottom: {border}; padding: 6px 4px; }}\n\
         .bs-invoice .bs-items td {{ font-size: {td}px; border-bottom: {border}; padding: 6px 4px; }}\n\
         .bs-invoice .bs-num {{ text-align: right; white-space: nowrap; }}\n",
        th = px(SizeRole::TableHeader),
        td = px(SizeRole::TableRow),
        accent = style.accent,
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-summary {{ width: auto; margin-left: auto; }}\n\
         .bs-invoice .bs-summary td {{ padding: 4px 4px 4px 24px; }}\n\
         .bs-invoice .bs-summary .bs-total td {{ font-size: {total}px; font-weight: 700; \
         color: {accent}; border-top: {border}; }}\n",
        total = px(SizeRole::Total),
        accent = style.accent,
    ));
    css.push_str(&format!(
        ".bs-invoice .bs-footer {{ font-size: {}px; color: #6b7280; text-align: center; }}\n",
        px(SizeRole::Footer)
    ));

    match mode {
        HtmlMode::Interactive => {
            css.push_str(&format!(
                ".bs-invoice {{ width: {width}px; max-width: 100%; padding: {pad}px; \
                 background: #ffffff; border: {border}; margin: 0 auto; }}\n\
                 .bs-invoice [data-design-field] {{ cursor: pointer; }}\n",
                width = style.page_width_px(),
                pad = style.page_padding_px(),
            ));
        }
        HtmlMode::Print => {
            css.push_str(&format!(
                "@page {{ size: {}; margin: {}mm; }}\n",
                style.page_css(),
                crate::style::PAGE_MARGIN_MM
            ));
            css.push_str(
                "html, body { margin: 0; padding: 0; background: #ffffff; }\n\
                 .bs-invoice { width: 100%; }\n\
                 .bs-invoice .bs-section { break-inside: avoid; page-break-inside: avoid; }\n\
                 .bs-invoice .bs-items tr { break-inside: avoid; }\n\
                 .bs-invoice .bs-items thead { display: table-header-group; }\n",
            );
        }
    }
    css
}

// ============================================================================
// BLOCKS
// ============================================================================

fn render_header(header: &HeaderBlock, logo_position: LogoPosition, mode: HtmlMode) -> String {
    let position = match logo_position {
        LogoPosition::Left => "left",
        LogoPosition::Right => "right",
        LogoPosition::Top => "top",
    };
    let mut out = format!(
        "<header class=\"bs-section bs-header bs-logo-{}\"{}>\n<div class=\"bs-brand\">\n",
        position,
        field_attr(mode, Section::CompanyDetails.key())
    );
    if let Some(url) = &header.logo_url {
        out.push_str(&format!(
            "<img class=\"bs-logo\" src=\"{}\" alt=\"{} logo\"{}>\n",
            escape_attribute(url),
            escape_attribute(&header.company_name),
            field_attr(mode, "logoPosition")
        ));
    }
    out.push_str("<div class=\"bs-company\">\n");
    out.push_str(&format!(
        "<div class=\"bs-company-name\">{}</div>\n",
        escape_text(&header.company_name)
    ));
    for line in &header.company_lines {
        out.push_str(&format!("<div class=\"bs-muted\">{}</div>\n", escape_text(line)));
    }
    out.push_str("</div>\n</div>\n<div class=\"bs-meta\">\n");
    out.push_str(&format!(
        "<h1 class=\"bs-title\"{}>{}</h1>\n<dl>\n",
        field_attr(mode, "accentColorHex"),
        escape_text(&header.title)
    ));
    for (label, value) in &header.meta {
        out.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>\n",
            escape_text(label),
            escape_text(value)
        ));
    }
    out.push_str("</dl>\n</div>\n</header>\n");
    out
}

fn render_client(client: &ClientBlock, mode: HtmlMode) -> String {
    let mut out = format!(
        "<section class=\"bs-section bs-client-details\"{}>\n<h2 class=\"bs-section-title\">{}</h2>\n",
        field_attr(mode, Section::ClientDetails.key()),
        escape_text(&client.heading)
    );
    out.push_str(&format!(
        "<div class=\"bs-company-name\">{}</div>\n",
        escape_text(&client.name)
    ));
    for line in &client.lines {
        out.push_str(&format!("<div class=\"bs-muted\">{}</div>\n", escape_text(line)));
    }
    out.push_str("</section>\n");
    out
}

fn render_items(items: &LineItemsBlock, mode: HtmlMode) -> String {
    let mut out = format!(
        "<section class=\"bs-section bs-line-items\"{}>\n<table class=\"bs-items\">\n<thead><tr>",
        field_attr(mode, "borderStyle")
    );
    for (i, column) in items.columns.iter().enumerate() {
        let class = if i == 0 { "" } else { " class=\"bs-num\"" };
        out.push_str(&format!("<th{}>{}</th>", class, escape_text(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &items.rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"bs-num\">{}</td><td class=\"bs-num\">{}</td><td class=\"bs-num\">{}</td></tr>\n",
            escape_text(&row.description),
            escape_text(&row.quantity),
            escape_text(&row.unit_price),
            escape_text(&row.amount)
        ));
    }
    out.push_str("</tbody>\n</table>\n</section>\n");
    out
}

fn render_summary(summary: &SummaryBlock, mode: HtmlMode) -> String {
    let mut out = String::from("<section class=\"bs-section bs-summary-section\">\n<table class=\"bs-summary\">\n");
    for row in &summary.rows {
        let (class, field) = match row.kind {
            SummaryKind::Subtotal => ("bs-subtotal", String::new()),
            SummaryKind::Discount => ("bs-discount", field_attr(mode, Section::DiscountRow.key())),
            SummaryKind::Tax => ("bs-tax", field_attr(mode, Section::TaxRow.key())),
            SummaryKind::Total => ("bs-total", String::new()),
        };
        out.push_str(&format!(
            "<tr class=\"{}\"{}><td>{}</td><td class=\"bs-num\">{}</td></tr>\n",
            class,
            field,
            escape_text(&row.label),
            escape_text(&row.value)
        ));
    }
    out.push_str("</table>\n</section>\n");
    out
}

fn render_text(name: &str, section: Option<Section>, text: &TextBlock, mode: HtmlMode) -> String {
    let mut out = format!(
        "<section class=\"bs-section bs-{}\"{}>\n",
        name,
        section_attr(mode, section)
    );
    if let Some(heading) = &text.heading {
        out.push_str(&format!(
            "<h2 class=\"bs-section-title\">{}</h2>\n",
            escape_text(heading)
        ));
    }
    out.push_str(&format!("<p>{}</p>\n</section>\n", paragraph(&text.body)));
    out
}

fn render_footer(text: &TextBlock, mode: HtmlMode) -> String {
    format!(
        "<footer class=\"bs-section bs-footer\"{}>\n<p>{}</p>\n</footer>\n",
        field_attr(mode, Section::Footer.key()),
        paragraph(&text.body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{DesignOverrides, HexColor, PartialStyleTokens, presets, resolve};
    use crate::invoice::{Client, Invoice, LineItem, Organization};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        Invoice {
            id: "inv_1".into(),
            organization_id: "org_1".into(),
            number: "INV-0001".into(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
            currency: "GBP".into(),
            client: Client {
                name: "Acme & Co.".into(),
                email: None,
                address: None,
            },
            items: vec![LineItem::new("Design <b>", dec!(2), dec!(25))],
            tax_rate: dec!(20),
            discount_rate: dec!(0),
            notes: Some("Line one\nLine two".into()),
            terms: None,
            payment_details: None,
            template_id: "classic".into(),
            design_snapshot: None,
        }
    }

    fn org() -> Organization {
        Organization {
            id: "org_1".into(),
            name: "Studio".into(),
            logo_url: Some("https://cdn.test/logo.png".into()),
            ..Default::default()
        }
    }

    fn plan(template: &str) -> DocumentPlan {
        let style = resolve(presets::by_id_or_default(template), None);
        DocumentPlan::build(&invoice(), &org(), &style).unwrap()
    }

    #[test]
    fn test_interactive_is_fragment_with_field_hooks() {
        let html = render_html(&plan("classic"), HtmlMode::Interactive);
        assert!(html.starts_with("<article"));
        assert!(!html.contains("<html"));
        assert!(html.contains("data-design-field=\"companyDetails\""));
        assert!(html.contains("data-design-field=\"taxRow\""));
        assert!(html.contains("width: 794px"));
    }

    #[test]
    fn test_print_is_document_with_page_rules() {
        let html = render_html(&plan("classic"), HtmlMode::Print);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("@page { size: A4; margin: 16mm; }"));
        assert!(html.contains("break-inside: avoid"));
        assert!(!html.contains("data-design-field"));
        assert!(html.contains("<title>Invoice INV-0001</title>"));
    }

    #[test]
    fn test_print_letter_page() {
        let html = render_html(&plan("minimal"), HtmlMode::Print);
        assert!(html.contains("size: letter"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_html(&plan("classic"), HtmlMode::Interactive);
        assert!(html.contains("Acme &amp; Co."));
        assert!(html.contains("Design &lt;b&gt;"));
        assert!(html.contains("Line one<br>Line two"));
    }

    #[test]
    fn test_accent_override_reaches_headings() {
        let overrides = DesignOverrides {
            template_id: "classic".into(),
            tokens: PartialStyleTokens {
                accent_color_hex: HexColor::parse("#ff0000"),
                ..Default::default()
            },
            ..Default::default()
        };
        let style = resolve(presets::by_id_or_default("classic"), Some(&overrides));
        let html = render_html(&DocumentPlan::build(&invoice(), &org(), &style).unwrap(), HtmlMode::Print);
        assert!(html.contains("font-size: 28px; color: #ff0000;"));
        assert!(html.contains("border-bottom: 2px solid #9ca3af"));
    }

    #[test]
    fn test_logo_layout_classes() {
        assert!(render_html(&plan("classic"), HtmlMode::Interactive).contains("bs-logo-left"));
        assert!(render_html(&plan("modern"), HtmlMode::Interactive).contains("bs-logo-right"));
        let minimal = render_html(&plan("minimal"), HtmlMode::Interactive);
        assert!(minimal.contains("bs-logo-top"));
        assert!(minimal.contains("flex-direction: column"));
    }

    #[test]
    fn test_hidden_terms_absent_from_both_modes() {
        // minimal hides terms and the footer
        for mode in [HtmlMode::Interactive, HtmlMode::Print] {
            let html = render_html(&plan("minimal"), mode);
            assert!(!html.contains("bs-terms"));
            assert!(!html.contains("<footer"));
        }
    }
}
