//! # Rendering Module
//!
//! Three backends over one [`DocumentPlan`](crate::plan::DocumentPlan):
//!
//! - [`html`]: interactive preview fragment and print document
//! - [`pdf`]: paginated PDF assembled with `lopdf`
//!
//! ## Usage Example
//!
//! ```
//! use billsend::design::{presets, resolve};
//! use billsend::render::{render, RenderedOutput, Target};
//! # use billsend::invoice::{Invoice, Organization};
//! # let invoice: Invoice = serde_json::from_str(r#"{"id":"inv_1","organization_id":"org_1",
//! #   "number":"INV-1","issue_date":"2025-03-05","due_date":"2025-04-04","currency":"GBP",
//! #   "client":{"name":"Acme"},"items":[{"description":"Work","quantity":"1","unit_price":"12.5"}]}"#).unwrap();
//! # let org = Organization { id: "org_1".into(), name: "Studio".into(), ..Default::default() };
//!
//! let style = resolve(presets::by_id_or_default("classic"), None);
//! let RenderedOutput::Html(html) = render(Target::Print, &invoice, &org, &style)? else {
//!     unreachable!()
//! };
//! assert!(html.contains("GBP 12.50"));
//! # Ok::<(), billsend::BillsendError>(())
//! ```

pub mod html;
pub mod pdf;

pub use html::{HtmlMode, render_html};
pub use pdf::{DEFAULT_PDF_TIMEOUT, LocalPdf, PdfBackend, PdfJob, RemotePdf, render_pdf};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::design::ResolvedStyle;
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization};
use crate::plan::DocumentPlan;

/// Rendering target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Interactive,
    Print,
    Pdf,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Interactive, Target::Print, Target::Pdf];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Interactive => "interactive",
            Target::Print => "print",
            Target::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = BillsendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BillsendError::InvalidInput(format!(
                    "Unknown target '{}' (expected interactive, print, or pdf)",
                    s
                ))
            })
    }
}

/// What a render call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    Html(String),
    Pdf(Vec<u8>),
}

impl RenderedOutput {
    pub fn content_type(&self) -> &'static str {
        match self {
            RenderedOutput::Html(_) => "text/html; charset=utf-8",
            RenderedOutput::Pdf(_) => "application/pdf",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderedOutput::Html(html) => html.into_bytes(),
            RenderedOutput::Pdf(bytes) => bytes,
        }
    }
}

/// Render an invoice for one target.
///
/// Synchronous and free of I/O: the PDF target embeds no logo here. Use a
/// [`PdfBackend`] when the logo should be fetched.
pub fn render(
    target: Target,
    invoice: &Invoice,
    organization: &Organization,
    style: &ResolvedStyle,
) -> Result<RenderedOutput, BillsendError> {
    let plan = DocumentPlan::build(invoice, organization, style)?;
    Ok(match target {
        Target::Interactive => RenderedOutput::Html(render_html(&plan, HtmlMode::Interactive)),
        Target::Print => RenderedOutput::Html(render_html(&plan, HtmlMode::Print)),
        Target::Pdf => RenderedOutput::Pdf(pdf::render_document(&plan, None)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse() {
        assert_eq!("pdf".parse::<Target>().unwrap(), Target::Pdf);
        assert_eq!("Print".parse::<Target>().unwrap(), Target::Print);
        assert!("docx".parse::<Target>().is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(RenderedOutput::Pdf(vec![]).content_type(), "application/pdf");
        assert!(RenderedOutput::Html(String::new()).content_type().starts_with("text/html"));
    }
}
