//! Text formatting shared by every rendering target.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::round_cents;

/// `"{currency} {amount:.2}"`, e.g. `GBP 12.50`. No locale symbols.
///
/// Half-cent values round away from zero, the same way line amounts do.
pub fn format_money(currency: &str, amount: Decimal) -> String {
    format!("{} {:.2}", currency, round_cents(amount))
}

/// `"<day> <Month> <year>"`, e.g. `5 March 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Lowercase ASCII alphanumerics with every other run collapsed to one hyphen,
/// trimmed of leading and trailing hyphens.
pub fn kebab(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// `"<YYYY-MM-DD>-<client>-<number>.pdf"`; empty components are dropped.
pub fn pdf_filename(issue_date: NaiveDate, client_name: &str, invoice_number: &str) -> String {
    let parts: Vec<String> = [
        issue_date.format("%Y-%m-%d").to_string(),
        kebab(client_name),
        kebab(invoice_number),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect();
    format!("{}.pdf", parts.join("-"))
}

/// `Content-Disposition` value for serving a PDF inline.
pub fn content_disposition(filename: &str) -> String {
    format!("inline; filename=\"{}\"", filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("GBP", dec!(12.5)), "GBP 12.50");
        assert_eq!(format_money("USD", dec!(1234)), "USD 1234.00");
        assert_eq!(format_money("EUR", Decimal::ZERO), "EUR 0.00");
    }

    #[test]
    fn test_format_money_rounds_half_away_from_zero() {
        assert_eq!(format_money("GBP", dec!(0.335)), "GBP 0.34");
        assert_eq!(format_money("GBP", dec!(0.005)), "GBP 0.01");
        assert_eq!(format_money("GBP", dec!(1.999)), "GBP 2.00");
        assert_eq!(format_money("GBP", dec!(-0.005)), "GBP -0.01");
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date(date(2025, 3, 5)), "5 March 2025");
        assert_eq!(format_long_date(date(2024, 12, 31)), "31 December 2024");
    }

    #[test]
    fn test_kebab() {
        assert_eq!(kebab("Acme & Co."), "acme-co");
        assert_eq!(kebab("INV-0007/A"), "inv-0007-a");
        assert_eq!(kebab("  --Hello   World--  "), "hello-world");
        assert_eq!(kebab("!!!"), "");
    }

    #[test]
    fn test_pdf_filename() {
        assert_eq!(
            pdf_filename(date(2024, 3, 5), "Acme & Co.", "INV-0007/A"),
            "2024-03-05-acme-co-inv-0007-a.pdf"
        );
    }

    #[test]
    fn test_pdf_filename_skips_empty_parts() {
        assert_eq!(
            pdf_filename(date(2024, 3, 5), "???", "42"),
            "2024-03-05-42.pdf"
        );
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("a.pdf"),
            "inline; filename=\"a.pdf\""
        );
    }
}
