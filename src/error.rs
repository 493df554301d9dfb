//! # Error Types
//!
//! This module defines error types used throughout the billsend library.
//!
//! Style resolution has no error case: a malformed override simply loses to
//! the template default. Everything that can fail sits at an I/O boundary
//! (repository, draft files, logo fetch, PDF service) or in configuration.

use thiserror::Error;

/// Main error type for billsend operations
#[derive(Debug, Error)]
pub enum BillsendError {
    /// Missing or inconsistent configuration (e.g. remote PDF backend without an endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown invoice, template, or organization mismatch
    #[error("Not found: {0}")]
    NotFound(String),

    /// No organization on the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// PDF rendering exceeded its time bound
    #[error("PDF rendering timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// External PDF service or logo host failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Request data that cannot be used (bad invoice file, invalid template body)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document assembly failed
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BillsendError {
    /// Whether this is the time-bound failure of a PDF render, as opposed to
    /// any other upstream problem.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BillsendError::Timeout { .. })
    }
}

impl From<lopdf::Error> for BillsendError {
    fn from(err: lopdf::Error) -> Self {
        BillsendError::Render(format!("PDF assembly failed: {}", err))
    }
}
