//! # Billsend - Invoice Design Engine
//!
//! Billsend turns an invoice plus a small set of design tokens into three
//! consistent outputs:
//!
//! - **Interactive HTML**: a preview fragment with selectable design regions
//! - **Print HTML**: a standalone document sized for A4 or Letter
//! - **PDF**: assembled in-process, or delegated to a rendering service
//!
//! ## Quick Start
//!
//! ```no_run
//! use billsend::{
//!     design::{presets, resolve, DesignOverrides},
//!     invoice::{Invoice, Organization},
//!     render::{render, Target},
//! };
//!
//! # fn example(invoice: Invoice, org: Organization) -> Result<(), billsend::BillsendError> {
//! let template = presets::by_id_or_default("modern");
//! let style = resolve(template, Some(&DesignOverrides::for_template("modern")));
//!
//! let html = render(Target::Print, &invoice, &org, &style)?;
//! std::fs::write("invoice.html", html.into_bytes())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`design`] | Tokens, presets, override resolution, editor session |
//! | [`style`] | Token to CSS and PDF geometry mapping |
//! | [`invoice`] | Invoice records, totals, formatting |
//! | [`plan`] | Backend-neutral document plan |
//! | [`render`] | HTML and PDF renderers |
//! | [`store`] | Template and snapshot persistence |
//! | [`drafts`] | Debounced draft autosave |
//! | [`server`] | HTTP API |
//! | [`config`] | Server configuration |
//! | [`error`] | Error types |

pub mod config;
pub mod design;
pub mod drafts;
pub mod error;
pub mod invoice;
pub mod plan;
pub mod render;
pub mod server;
pub mod store;
pub mod style;

pub use error::BillsendError;
