//! # Configuration
//!
//! Server settings come from command-line flags with `BILLSEND_*`
//! environment fallbacks, and are checked once at startup.
//!
//! | Flag | Env | Default |
//! |------|-----|---------|
//! | `--environment` | `BILLSEND_ENV` | `development` |
//! | `--listen` | `BILLSEND_LISTEN` | `127.0.0.1:8080` |
//! | `--pdf-backend` | `BILLSEND_PDF_BACKEND` | `local` |
//! | `--pdf-endpoint` | `BILLSEND_PDF_ENDPOINT` | none (required for `remote`) |
//! | `--pdf-timeout` | `BILLSEND_PDF_TIMEOUT` | `60` seconds |
//! | `--draft-dir` | `BILLSEND_DRAFT_DIR` | none |
//! | `--seed` | `BILLSEND_SEED` | none |
//! | `--log-json` | `BILLSEND_LOG_JSON` | off |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::error::BillsendError;
use crate::render::pdf::{DEFAULT_PDF_TIMEOUT, LocalPdf, PdfBackend, RemotePdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PdfBackendKind {
    /// Assemble PDFs in-process.
    Local,
    /// Post print HTML to an external rendering service.
    Remote,
}

/// Raw server flags.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Deployment environment; production hides internal error details
    #[arg(long, env = "BILLSEND_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Address to listen on
    #[arg(long, env = "BILLSEND_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// PDF backend
    #[arg(long, env = "BILLSEND_PDF_BACKEND", value_enum, default_value = "local")]
    pub pdf_backend: PdfBackendKind,

    /// Rendering service URL for the remote backend
    #[arg(long, env = "BILLSEND_PDF_ENDPOINT")]
    pub pdf_endpoint: Option<String>,

    /// PDF rendering time limit in seconds
    #[arg(long, env = "BILLSEND_PDF_TIMEOUT", default_value = "60")]
    pub pdf_timeout: u64,

    /// Directory for design drafts
    #[arg(long, env = "BILLSEND_DRAFT_DIR")]
    pub draft_dir: Option<PathBuf>,

    /// JSON file with organizations, invoices, and custom templates
    #[arg(long, env = "BILLSEND_SEED")]
    pub seed: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "BILLSEND_LOG_JSON")]
    pub log_json: bool,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub listen_addr: String,
    pub pdf_backend: PdfBackendKind,
    pub pdf_endpoint: Option<String>,
    pub pdf_timeout: Duration,
    pub draft_dir: Option<PathBuf>,
    pub seed_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            listen_addr: "127.0.0.1:8080".to_string(),
            pdf_backend: PdfBackendKind::Local,
            pdf_endpoint: None,
            pdf_timeout: DEFAULT_PDF_TIMEOUT,
            draft_dir: None,
            seed_path: None,
        }
    }
}

impl TryFrom<ServeArgs> for AppConfig {
    type Error = BillsendError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let config = AppConfig {
            environment: args.environment,
            listen_addr: args.listen,
            pdf_backend: args.pdf_backend,
            pdf_endpoint: args.pdf_endpoint.filter(|e| !e.trim().is_empty()),
            pdf_timeout: Duration::from_secs(args.pdf_timeout),
            draft_dir: args.draft_dir,
            seed_path: args.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), BillsendError> {
        if self.pdf_backend == PdfBackendKind::Remote && self.pdf_endpoint.is_none() {
            return Err(BillsendError::Config(
                "--pdf-backend remote requires --pdf-endpoint (BILLSEND_PDF_ENDPOINT)".into(),
            ));
        }
        if self.pdf_timeout.is_zero() {
            return Err(BillsendError::Config(
                "--pdf-timeout must be at least one second".into(),
            ));
        }
        if self.listen_addr.trim().is_empty() {
            return Err(BillsendError::Config("--listen must not be empty".into()));
        }
        Ok(())
    }

    /// Construct the configured PDF backend.
    pub fn pdf_backend(&self) -> Result<Arc<dyn PdfBackend>, BillsendError> {
        match self.pdf_backend {
            PdfBackendKind::Local => Ok(Arc::new(LocalPdf::new()?)),
            PdfBackendKind::Remote => {
                let endpoint = self.pdf_endpoint.clone().ok_or_else(|| {
                    BillsendError::Config("remote PDF backend requires an endpoint".into())
                })?;
                Ok(Arc::new(RemotePdf::new(endpoint)?))
            }
        }
    }
}
