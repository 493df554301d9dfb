//! Page layout: turns a [`DocumentPlan`] into positioned drawing ops.
//!
//! The layouter keeps a cursor measured from the top edge and opens a new
//! page whenever the next unit would cross the bottom margin. A unit is at
//! most a few lines: one line of text, a heading with its first line, or the
//! summary. Long descriptions and address blocks carry on to the next page
//! line by line, and the line-item header is repeated on every page the
//! table spans. Nothing has a fixed height, so content is never clipped.
//!
//! Numeric cells shrink to fit their column, and wrap once they reach
//! [`MIN_CELL_SCALE`] of the row size.
//!
//! Ops carry PDF coordinates (origin bottom-left, y up) so the writer can
//! emit them without further arithmetic.

use super::metrics::{text_width, wrap};
use crate::design::LogoPosition;
use crate::plan::{
    Block, ClientBlock, DocumentPlan, HeaderBlock, LineItemsBlock, SummaryBlock, SummaryKind,
    TextBlock,
};
use crate::style::SizeRole;
use crate::style::pdf::{PdfStyle, Rgb};

/// Baseline offset below the top of a line box, as a fraction of font size.
const ASCENT: f32 = 0.8;
/// Line box height as a multiple of font size.
const LEADING: f32 = 1.35;
/// Horizontal padding inside table cells.
const CELL_PAD: f32 = 4.0;
/// Vertical padding above and below table rows.
const ROW_PAD: f32 = 4.0;
/// Space between the logo and the text beside it.
const LOGO_GAP: f32 = 12.0;
/// Smallest numeric cell font, as a fraction of the row size.
pub const MIN_CELL_SCALE: f32 = 0.6;

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfOp {
    /// Single line of text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    /// Horizontal rule.
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
        color: Rgb,
    },
    /// The organization logo; `(x, y)` is the lower-left corner.
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<PdfOp>,
}

impl PageLayout {
    /// All text on the page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PdfOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<PageLayout>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lay out a plan. `logo` is the pixel size of an available logo image;
/// without one the header is laid out as if the organization had none.
pub fn layout(plan: &DocumentPlan, logo: Option<(u32, u32)>) -> Layout {
    let style = PdfStyle::from_resolved(&plan.style);
    let mut layouter = Layouter::new(&style);

    for (i, block) in plan.blocks.iter().enumerate() {
        if i > 0 {
            layouter.gap();
        }
        match block {
            Block::Header(header) => {
                layouter.header(header, plan.style.tokens.logo_position, logo)
            }
            Block::ClientDetails(client) => layouter.client(client),
            Block::LineItems(items) => layouter.items(items),
            Block::Summary(summary) => layouter.summary(summary),
            Block::Notes(text) | Block::Terms(text) | Block::PaymentDetails(text) => {
                layouter.text_block(text)
            }
            Block::Footer(text) => layouter.footer(text),
        }
    }

    Layout {
        page_width: style.page_width,
        page_height: style.page_height,
        pages: layouter.pages,
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Right,
    Center,
}

/// Where a column of lines will continue: a page and a top offset on it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Flow {
    page: usize,
    top: f32,
}

struct Layouter<'a> {
    style: &'a PdfStyle,
    pages: Vec<PageLayout>,
    /// Distance from the top edge to the next free line.
    cursor: f32,
}

impl<'a> Layouter<'a> {
    fn new(style: &'a PdfStyle) -> Self {
        Self {
            style,
            pages: vec![PageLayout::default()],
            cursor: style.margin,
        }
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    fn left(&self) -> f32 {
        self.style.margin
    }

    fn right(&self) -> f32 {
        self.style.page_width - self.style.margin
    }

    fn bottom(&self) -> f32 {
        self.style.page_height - self.style.margin
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= self.style.margin + f32::EPSILON
    }

    fn line_height(&self, role: SizeRole) -> f32 {
        self.style.size(role) * LEADING
    }

    /// Start a new page if `height` doesn't fit below the cursor. Returns
    /// whether a page break happened.
    fn ensure(&mut self, height: f32) -> bool {
        if self.cursor + height > self.bottom() && !self.at_page_top() {
            self.pages.push(PageLayout::default());
            self.cursor = self.style.margin;
            true
        } else {
            false
        }
    }

    fn gap(&mut self) {
        if !self.at_page_top() {
            self.cursor += self.style.section_gap;
        }
    }

    fn push(&mut self, op: PdfOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn push_to(&mut self, page: usize, op: PdfOp) {
        if let Some(page) = self.pages.get_mut(page) {
            page.ops.push(op);
        }
    }

    /// A flow starting at `top` on the current page.
    fn flow(&self, top: f32) -> Flow {
        Flow {
            page: self.pages.len() - 1,
            top,
        }
    }

    /// Reserve one line of `height` in `flow`, moving the flow to the next
    /// page when the line would cross the bottom margin. Returns the line's
    /// top.
    fn advance(&mut self, flow: &mut Flow, height: f32) -> f32 {
        if flow.top + height > self.bottom() && flow.top > self.style.margin + f32::EPSILON {
            flow.page += 1;
            flow.top = self.style.margin;
            while self.pages.len() <= flow.page {
                self.pages.push(PageLayout::default());
            }
        }
        let top = flow.top;
        flow.top += height;
        top
    }

    /// Continue the main cursor below whichever of `flows` ends lowest on
    /// the last page.
    fn resume(&mut self, flows: &[Flow]) {
        let last = self.pages.len() - 1;
        self.cursor = flows
            .iter()
            .filter(|f| f.page == last)
            .map(|f| f.top)
            .fold(self.style.margin, f32::max);
    }

    /// One line of text whose line box starts at `top`, at an explicit size.
    #[allow(clippy::too_many_arguments)]
    fn text_op(&self, align: Align, anchor: f32, top: f32, size: f32, bold: bool, color: Rgb, text: &str) -> Option<PdfOp> {
        if text.is_empty() {
            return None;
        }
        let width = text_width(text, size, bold);
        let x = match align {
            Align::Left => anchor,
            Align::Right => anchor - width,
            Align::Center => anchor - width / 2.0,
        };
        Some(PdfOp::Text {
            x,
            y: self.style.page_height - (top + size * ASCENT),
            size,
            bold,
            color,
            text: text.to_string(),
        })
    }

    /// Draw one line of text whose line box starts at `top`.
    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, align: Align, anchor: f32, top: f32, role: SizeRole, bold: bool, color: Rgb, text: &str) {
        let size = self.style.size(role);
        if let Some(op) = self.text_op(align, anchor, top, size, bold, color, text) {
            self.push(op);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_in(&mut self, flow: &mut Flow, align: Align, anchor: f32, role: SizeRole, bold: bool, color: Rgb, text: &str) {
        let top = self.advance(flow, self.line_height(role));
        let size = self.style.size(role);
        if let Some(op) = self.text_op(align, anchor, top, size, bold, color, text) {
            self.push_to(flow.page, op);
        }
    }

    /// Horizontal rule at `top` across the content width, if borders are on.
    fn rule(&mut self, top: f32) {
        let Some(color) = self.style.border_color else {
            return;
        };
        if self.style.border_width <= 0.0 {
            return;
        }
        self.push(PdfOp::Rule {
            x1: self.left(),
            x2: self.right(),
            y: self.style.page_height - top,
            width: self.style.border_width,
            color,
        });
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn header(&mut self, header: &HeaderBlock, position: LogoPosition, logo: Option<(u32, u32)>) {
        let style = self.style;
        let top = self.cursor;

        let logo_size = logo
            .filter(|&(w, h)| w > 0 && h > 0 && header.logo_url.is_some())
            .map(|(w, h)| {
                let role = match position {
                    LogoPosition::Top => SizeRole::LogoTop,
                    LogoPosition::Left | LogoPosition::Right => SizeRole::LogoSide,
                };
                let height = style.size(role);
                let width = (height * w as f32 / h as f32).min(style.content_width() / 3.0);
                (width, height)
            });

        let mut brand_top = top;
        let mut brand_anchor = self.left();
        let mut brand_align = Align::Left;
        let mut meta_align = Align::Right;
        let mut meta_anchor = self.right();
        let mut side_logo_height = 0.0;

        if let Some((width, height)) = logo_size {
            let (x, y_top) = match position {
                LogoPosition::Top => {
                    brand_top = top + height + 8.0;
                    (self.left(), top)
                }
                LogoPosition::Left => {
                    brand_anchor = self.left() + width + LOGO_GAP;
                    side_logo_height = height;
                    (self.left(), top)
                }
                LogoPosition::Right => {
                    brand_anchor = self.right() - width - LOGO_GAP;
                    brand_align = Align::Right;
                    meta_align = Align::Left;
                    meta_anchor = self.left();
                    side_logo_height = height;
                    (self.right() - width, top)
                }
            };
            self.push(PdfOp::Logo {
                x,
                y: style.page_height - (y_top + height),
                width,
                height,
            });
        } else if position == LogoPosition::Right {
            brand_anchor = self.right();
            brand_align = Align::Right;
            meta_align = Align::Left;
            meta_anchor = self.left();
        }

        // both columns and the side logo start on this page
        let mut brand = self.flow(brand_top);
        let mut meta = self.flow(brand_top);
        let logo_bottom = self.flow(top + side_logo_height);

        // Company block
        self.text_in(&mut brand, brand_align, brand_anchor, SizeRole::Body, true, style.text, &header.company_name);
        for line in &header.company_lines {
            self.text_in(&mut brand, brand_align, brand_anchor, SizeRole::Body, false, style.muted, line);
        }

        // Title and meta
        let body = self.line_height(SizeRole::Body);
        self.text_in(&mut meta, meta_align, meta_anchor, SizeRole::InvoiceHeading, true, style.accent, &header.title);
        let size = style.size(SizeRole::Body);
        let label_width = header
            .meta
            .iter()
            .map(|(label, _)| text_width(label, size, false))
            .fold(0.0, f32::max);
        let value_width = header
            .meta
            .iter()
            .map(|(_, value)| text_width(value, size, false))
            .fold(0.0, f32::max);
        for (label, value) in &header.meta {
            let y = self.advance(&mut meta, body);
            let (label_op, value_op) = match meta_align {
                Align::Left => (
                    self.text_op(Align::Left, meta_anchor, y, size, false, style.muted, label),
                    self.text_op(Align::Left, meta_anchor + label_width + 10.0, y, size, false, style.text, value),
                ),
                Align::Right | Align::Center => (
                    self.text_op(Align::Right, meta_anchor - value_width - 10.0, y, size, false, style.muted, label),
                    self.text_op(Align::Right, meta_anchor, y, size, false, style.text, value),
                ),
            };
            for op in [label_op, value_op].into_iter().flatten() {
                self.push_to(meta.page, op);
            }
        }

        self.resume(&[brand, logo_bottom, meta]);
    }

    fn client(&mut self, client: &ClientBlock) {
        let style = self.style;
        let heading = self.line_height(SizeRole::SectionHeader);
        let body = self.line_height(SizeRole::Body);
        // heading stays with the client name
        self.ensure(heading + body);

        let left = self.left();
        let mut flow = self.flow(self.cursor);
        self.text_in(&mut flow, Align::Left, left, SizeRole::SectionHeader, true, style.accent, &client.heading);
        self.text_in(&mut flow, Align::Left, left, SizeRole::Body, true, style.text, &client.name);
        for line in &client.lines {
            self.text_in(&mut flow, Align::Left, left, SizeRole::Body, false, style.muted, line);
        }
        self.resume(&[flow]);
    }

    fn column_bounds(&self) -> [(f32, f32); 4] {
        let widths = self.style.column_widths();
        let mut x = self.left();
        widths.map(|w| {
            let bounds = (x, x + w);
            x += w;
            bounds
        })
    }

    fn items_header(&mut self, items: &LineItemsBlock) {
        let style = self.style;
        let bounds = self.column_bounds();
        let top = self.cursor + ROW_PAD;
        for (i, column) in items.columns.iter().enumerate() {
            let (start, end) = bounds[i];
            if i == 0 {
                self.text(Align::Left, start + CELL_PAD, top, SizeRole::TableHeader, true, style.accent, column);
            } else {
                self.text(Align::Right, end - CELL_PAD, top, SizeRole::TableHeader, true, style.accent, column);
            }
        }
        self.cursor = top + self.line_height(SizeRole::TableHeader) + ROW_PAD;
        self.rule(self.cursor);
    }

    fn items(&mut self, items: &LineItemsBlock) {
        let style = self.style;
        let bounds = self.column_bounds();
        let row_size = style.size(SizeRole::TableRow);
        let row_line = self.line_height(SizeRole::TableRow);
        let header_height = self.line_height(SizeRole::TableHeader) + 2.0 * ROW_PAD;
        let description_width = (bounds[0].1 - bounds[0].0) - 2.0 * CELL_PAD;

        // first row line, with its padding, stays with the header
        self.ensure(header_height + row_line + 2.0 * ROW_PAD);
        self.items_header(items);

        for row in &items.rows {
            let description = wrap(&row.description, row_size, false, description_width);
            let cells: Vec<(f32, f32, Vec<String>)> = [&row.quantity, &row.unit_price, &row.amount]
                .into_iter()
                .zip(&bounds[1..])
                .map(|(cell, &(start, end))| {
                    let (size, lines) = fit_cell(cell, row_size, end - start - 2.0 * CELL_PAD);
                    (end - CELL_PAD, size, lines)
                })
                .collect();
            let line_count = cells
                .iter()
                .map(|(_, _, lines)| lines.len())
                .fold(description.len(), usize::max);

            for i in 0..line_count {
                let mut height = row_line;
                if i == 0 {
                    height += ROW_PAD;
                }
                if i + 1 == line_count {
                    height += ROW_PAD;
                }
                if self.ensure(height) {
                    self.items_header(items);
                }
                let top = self.cursor + if i == 0 { ROW_PAD } else { 0.0 };
                if let Some(line) = description.get(i) {
                    self.text(Align::Left, bounds[0].0 + CELL_PAD, top, SizeRole::TableRow, false, style.text, line);
                }
                for (anchor, size, lines) in &cells {
                    let Some(line) = lines.get(i) else {
                        continue;
                    };
                    // share the row's baseline
                    let cell_top = top + (row_size - size) * ASCENT;
                    if let Some(op) = self.text_op(Align::Right, *anchor, cell_top, *size, false, style.text, line) {
                        self.push(op);
                    }
                }
                self.cursor += height;
            }
            self.rule(self.cursor);
        }
    }

    fn summary(&mut self, summary: &SummaryBlock) {
        let style = self.style;
        let bounds = self.column_bounds();
        let value_anchor = self.right() - CELL_PAD;
        let label_anchor = bounds[3].0 - CELL_PAD;

        let height: f32 = summary
            .rows
            .iter()
            .map(|row| match row.kind {
                SummaryKind::Total => self.line_height(SizeRole::Total) + 2.0 * ROW_PAD,
                _ => self.line_height(SizeRole::Body),
            })
            .sum();
        self.ensure(height);

        for row in &summary.rows {
            match row.kind {
                SummaryKind::Total => {
                    self.cursor += ROW_PAD;
                    self.rule(self.cursor);
                    let top = self.cursor + ROW_PAD;
                    self.text(Align::Right, label_anchor, top, SizeRole::Total, true, style.accent, &row.label);
                    self.text(Align::Right, value_anchor, top, SizeRole::Total, true, style.accent, &row.value);
                    self.cursor = top + self.line_height(SizeRole::Total);
                }
                _ => {
                    let top = self.cursor;
                    self.text(Align::Right, label_anchor, top, SizeRole::Body, false, style.muted, &row.label);
                    self.text(Align::Right, value_anchor, top, SizeRole::Body, false, style.text, &row.value);
                    self.cursor += self.line_height(SizeRole::Body);
                }
            }
        }
    }

    fn text_block(&mut self, block: &TextBlock) {
        let style = self.style;
        let left = self.left();
        let body = self.line_height(SizeRole::Body);
        let lines = wrap(&block.body, style.size(SizeRole::Body), false, style.content_width());

        if let Some(heading) = &block.heading {
            let heading_height = self.line_height(SizeRole::SectionHeader);
            self.ensure(heading_height + body);
            let top = self.cursor;
            self.text(Align::Left, left, top, SizeRole::SectionHeader, true, style.accent, heading);
            self.cursor += heading_height;
        }
        for line in &lines {
            self.ensure(body);
            let top = self.cursor;
            self.text(Align::Left, left, top, SizeRole::Body, false, style.text, line);
            self.cursor += body;
        }
    }

    fn footer(&mut self, block: &TextBlock) {
        let style = self.style;
        let center = style.page_width / 2.0;
        let line = self.line_height(SizeRole::Footer);
        let lines = wrap(&block.body, style.size(SizeRole::Footer), false, style.content_width());
        for text in &lines {
            self.ensure(line);
            let top = self.cursor;
            self.text(Align::Center, center, top, SizeRole::Footer, false, style.muted, text);
            self.cursor += line;
        }
    }
}

/// Size and lines for a numeric cell `width` points wide: the row size if it
/// fits, else shrunk to fit, else wrapped at the smallest size.
fn fit_cell(text: &str, size: f32, width: f32) -> (f32, Vec<String>) {
    let natural = text_width(text, size, false);
    if natural <= width {
        return (size, vec![text.to_string()]);
    }
    let floor = size * MIN_CELL_SCALE;
    // tenths of a point, rounded down so the result never overflows
    let scaled = (size * width / natural * 10.0).floor() / 10.0;
    if scaled >= floor {
        return (scaled, vec![text.to_string()]);
    }
    (floor, wrap(text, floor, false, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{BorderStyle, HexColor, presets, resolve};
    use crate::invoice::{Client, Invoice, LineItem, Organization};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(items: usize) -> Invoice {
        Invoice {
            id: "inv_1".into(),
            organization_id: "org_1".into(),
            number: "INV-0001".into(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
            currency: "GBP".into(),
            client: Client {
                name: "Acme".into(),
                email: Some("billing@acme.test".into()),
                address: None,
            },
            items: (0..items)
                .map(|i| LineItem::new(format!("Item {}", i + 1), dec!(1), dec!(10)))
                .collect(),
            tax_rate: dec!(20),
            discount_rate: dec!(0),
            notes: Some("Thanks".into()),
            terms: Some("Net 30".into()),
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

    fn plan_for(template: &str, items: usize) -> DocumentPlan {
        let style = resolve(presets::by_id_or_default(template), None);
        DocumentPlan::build(&invoice(items), &org(), &style).unwrap()
    }

    fn all_text(layout: &Layout) -> Vec<String> {
        layout
            .pages
            .iter()
            .flat_map(|p| p.texts().map(String::from).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_short_invoice_single_page() {
        for template in ["classic", "modern", "minimal"] {
            let layout = layout(&plan_for(template, 3), Some((200, 100)));
            assert_eq!(layout.page_count(), 1, "{template}");
        }
    }

    #[test]
    fn test_long_invoice_paginates() {
        let layout = layout(&plan_for("classic", 200), None);
        assert!(layout.page_count() > 1);
        // every row made it
        let texts = all_text(&layout);
        assert!(texts.iter().any(|t| t == "Item 200"));
        // header repeated on every page the table spans
        for page in &layout.pages {
            if page.texts().any(|t| t.starts_with("Item ")) {
                assert!(page.texts().any(|t| t == "Description"));
            }
        }
    }

    #[test]
    fn test_nothing_below_bottom_margin() {
        let plan = plan_for("minimal", 200);
        let layout = layout(&plan, None);
        let style = PdfStyle::from_resolved(&plan.style);
        for page in &layout.pages {
            for op in &page.ops {
                if let PdfOp::Text { y, .. } = op {
                    assert!(*y >= style.margin - 1.0, "text at y={y} below margin");
                    assert!(*y <= style.page_height - style.margin);
                }
            }
        }
    }

    fn assert_within_margins(plan: &DocumentPlan, layout: &Layout) {
        let style = PdfStyle::from_resolved(&plan.style);
        for (n, page) in layout.pages.iter().enumerate() {
            for op in &page.ops {
                if let PdfOp::Text { y, text, .. } = op {
                    assert!(*y >= style.margin - 1.0, "page {n}: {text:?} at y={y} below margin");
                    assert!(*y <= style.page_height - style.margin, "page {n}: {text:?} at y={y} above margin");
                }
            }
        }
    }

    #[test]
    fn test_tall_row_continues_across_pages() {
        let mut invoice = invoice(2);
        invoice.items[0].description = vec!["word"; 3000].join(" ");
        let style = resolve(presets::by_id_or_default("classic"), None);
        let plan = DocumentPlan::build(&invoice, &org(), &style).unwrap();
        let layout = layout(&plan, None);

        assert!(layout.page_count() > 2);
        assert_within_margins(&plan, &layout);
        // the table header comes back on each continuation page
        for page in &layout.pages {
            if page.texts().any(|t| t.starts_with("word")) {
                assert!(page.texts().any(|t| t == "Description"));
            }
        }
        let texts = all_text(&layout);
        let words: usize = texts
            .iter()
            .filter(|t| t.starts_with("word"))
            .map(|t| t.split_whitespace().count())
            .sum();
        assert_eq!(words, 3000);
        assert!(texts.iter().any(|t| t == "Item 2"));
    }

    #[test]
    fn test_long_addresses_continue_across_pages() {
        let mut invoice = invoice(1);
        invoice.client.address = Some(
            (1..=80)
                .map(|i| format!("Client line {i}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        let organization = Organization {
            address: Some(
                (1..=80)
                    .map(|i| format!("Studio line {i}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ..org()
        };
        let style = resolve(presets::by_id_or_default("modern"), None);
        let plan = DocumentPlan::build(&invoice, &organization, &style).unwrap();
        let layout = layout(&plan, Some((100, 50)));

        assert!(layout.page_count() > 1);
        assert_within_margins(&plan, &layout);
        let texts = all_text(&layout);
        assert!(texts.iter().any(|t| t == "Studio line 80"));
        assert!(texts.iter().any(|t| t == "Client line 80"));
        // the header's meta column stays on the first page
        assert!(layout.pages[0].texts().any(|t| t == "INV-0001"));
    }

    #[test]
    fn test_large_amounts_stay_in_their_columns() {
        let mut invoice = invoice(1);
        invoice.items[0] = LineItem::new("Big", dec!(1000), dec!(123456789012.34));
        let style = resolve(presets::by_id_or_default("classic"), None);
        let plan = DocumentPlan::build(&invoice, &org(), &style).unwrap();
        let layout = layout(&plan, None);
        let pdf_style = PdfStyle::from_resolved(&plan.style);
        let bounds = Layouter::new(&pdf_style).column_bounds();

        let cells: Vec<(f32, f32, f32)> = layout.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                PdfOp::Text { x, size, text, .. } if text.contains("123456789012") => {
                    Some((*x, *x + text_width(text, *size, false), *size))
                }
                _ => None,
            })
            .collect();
        assert!(cells.len() >= 2, "{cells:?}");

        let row_size = pdf_style.size(SizeRole::TableRow);
        for (start, end, size) in cells {
            let column = bounds[1..]
                .iter()
                .find(|(a, b)| end <= *b + 0.01 && end > *a)
                .expect("cell ends inside a numeric column");
            assert!(start >= column.0, "text starts at {start}, column at {}", column.0);
            assert!(size >= row_size * MIN_CELL_SCALE - 0.01);
        }
    }

    #[test]
    fn test_fit_cell() {
        assert_eq!(fit_cell("GBP 1.00", 10.0, 200.0), (10.0, vec!["GBP 1.00".to_string()]));

        let (size, lines) = fit_cell("GBP 1234567.00", 10.0, 60.0);
        assert!(size < 10.0 && size >= 6.0);
        assert_eq!(lines.len(), 1);
        assert!(text_width(&lines[0], size, false) <= 60.0);

        let (size, lines) = fit_cell("GBP 123456789012345678.00", 10.0, 40.0);
        assert!((size - 6.0).abs() < 1e-4);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, size, false) <= 40.0));
    }

    #[test]
    fn test_heading_uses_accent() {
        let mut style = resolve(presets::by_id_or_default("classic"), None);
        style.tokens.accent_color_hex = HexColor::parse("#ff0000").unwrap();
        let layout = layout(&DocumentPlan::build(&invoice(1), &org(), &style).unwrap(), None);
        let heading = layout.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                PdfOp::Text { text, color, bold, .. } if text == "Invoice" => Some((*color, *bold)),
                _ => None,
            })
            .unwrap();
        assert_eq!(heading, (Rgb { r: 1.0, g: 0.0, b: 0.0 }, true));
    }

    #[test]
    fn test_border_weight_reaches_rules() {
        let mut style = resolve(presets::by_id_or_default("classic"), None);
        let strong = layout(&DocumentPlan::build(&invoice(2), &org(), &style).unwrap(), None);
        assert!(strong.pages[0]
            .ops
            .iter()
            .any(|op| matches!(op, PdfOp::Rule { width, .. } if *width == 2.0)));

        style.tokens.border_style = BorderStyle::None;
        let none = layout(&DocumentPlan::build(&invoice(2), &org(), &style).unwrap(), None);
        assert!(!none.pages[0].ops.iter().any(|op| matches!(op, PdfOp::Rule { .. })));
    }

    #[test]
    fn test_logo_only_with_image() {
        let with = layout(&plan_for("classic", 1), Some((100, 50)));
        assert!(with.pages[0].ops.iter().any(|op| matches!(op, PdfOp::Logo { .. })));
        let without = layout(&plan_for("classic", 1), None);
        assert!(!without.pages[0].ops.iter().any(|op| matches!(op, PdfOp::Logo { .. })));
    }

    #[test]
    fn test_letter_page_dimensions() {
        let layout = layout(&plan_for("minimal", 1), None);
        assert_eq!((layout.page_width, layout.page_height), (612.0, 792.0));
    }
}
