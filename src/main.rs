//! # Billsend CLI
//!
//! Command-line interface for the invoice design engine.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP API
//! billsend serve --seed demos/invoices.json
//!
//! # List built-in templates (plus an organization's custom ones)
//! billsend templates --seed demos/invoices.json --org org_studio
//!
//! # Render one invoice to a file
//! billsend render --seed demos/invoices.json --invoice inv_1001 --target pdf --out inv.pdf
//!
//! # Try a template with extra overrides without touching the invoice
//! billsend render --seed demos/invoices.json --invoice inv_1001 --target print \
//!     --template modern --overrides overrides.json --out inv.html
//!
//! # Inspect or drop an autosaved draft
//! billsend draft show --invoice inv_1001 --draft-dir drafts/
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use billsend::{
    BillsendError,
    config::{AppConfig, ServeArgs},
    design::{presets, DesignOverrides},
    drafts::{DraftStore, FileDraftStore},
    render::{
        pdf::{LocalPdf, PdfJob, render_pdf, DEFAULT_PDF_TIMEOUT},
        render, Target,
    },
    server,
    store::{
        self,
        memory::{MemoryRepository, Seed},
        DesignRepository,
    },
};

/// Billsend - invoice design and rendering
#[derive(Parser, Debug)]
#[command(name = "billsend")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// List available templates
    Templates {
        /// Seed file holding custom templates
        #[arg(long, value_name = "FILE", requires = "org")]
        seed: Option<PathBuf>,

        /// Organization whose custom templates to include
        #[arg(long)]
        org: Option<String>,
    },

    /// Render an invoice from a seed file
    Render {
        /// Seed file with the organization and invoice
        #[arg(long, value_name = "FILE")]
        seed: PathBuf,

        /// Invoice id
        #[arg(long)]
        invoice: String,

        /// Output target: interactive, print, or pdf
        #[arg(long, default_value = "print")]
        target: Target,

        /// Output file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Render with this template instead of the stored design
        #[arg(long)]
        template: Option<String>,

        /// JSON file with design overrides
        #[arg(long, value_name = "FILE")]
        overrides: Option<PathBuf>,
    },

    /// Inspect autosaved design drafts
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    /// Print the saved draft as JSON
    Show {
        #[arg(long)]
        invoice: String,
        #[arg(long, env = "BILLSEND_DRAFT_DIR", value_name = "DIR")]
        draft_dir: PathBuf,
    },
    /// Delete the saved draft
    Clear {
        #[arg(long)]
        invoice: String,
        #[arg(long, env = "BILLSEND_DRAFT_DIR", value_name = "DIR")]
        draft_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run() -> Result<(), BillsendError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_tracing(args.log_json, "billsend=info,tower_http=info");
            let config = AppConfig::try_from(args)?;
            server::serve(config).await?;
        }

        Commands::Templates { seed, org } => {
            init_tracing(false, "billsend=warn");
            println!("Built-in templates:");
            for template in presets::list() {
                println!("  {:<10} {}", template.id, template.description);
            }
            if let (Some(seed), Some(org)) = (seed, org) {
                let repo = MemoryRepository::from_seed(Seed::load(&seed).await?)?;
                let custom = repo.custom_templates(&org).await?;
                println!("\nCustom templates for {}:", org);
                if custom.is_empty() {
                    println!("  (none)");
                }
                for template in custom {
                    println!("  {}  {}", template.id, template.name);
                }
            }
        }

        Commands::Render {
            seed,
            invoice,
            target,
            out,
            template,
            overrides,
        } => {
            init_tracing(false, "billsend=warn");
            let repo = MemoryRepository::from_seed(Seed::load(&seed).await?)?;
            let record = find_invoice(&repo, &invoice).await?;
            let org = record.organization_id.clone();
            let organization = repo.organization(&org).await?;

            let style = if template.is_some() || overrides.is_some() {
                let mut patch = match &overrides {
                    Some(path) => read_overrides(path).await?,
                    None => DesignOverrides::default(),
                };
                if let Some(id) = template {
                    patch.template_id = id;
                }
                store::resolve_for_invoice(&repo, &org, &record, Some(&patch)).await?
            } else {
                store::rendering_style(&repo, &org, &record).await?
            };

            let bytes = match target {
                Target::Pdf => {
                    let job = PdfJob::new(&record, &organization, &style)?;
                    render_pdf(&LocalPdf::new()?, &job, DEFAULT_PDF_TIMEOUT).await?
                }
                _ => render(target, &record, &organization, &style)?.into_bytes(),
            };
            tokio::fs::write(&out, &bytes).await?;
            println!(
                "Rendered {} ({}, template {}) to {}",
                record.number,
                target,
                style.template_id,
                out.display()
            );
        }

        Commands::Draft { action } => {
            init_tracing(false, "billsend=warn");
            match action {
                DraftAction::Show { invoice, draft_dir } => {
                    let drafts = FileDraftStore::new(draft_dir);
                    match drafts.load(&invoice).await? {
                        Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
                        None => println!("No draft for {}", invoice),
                    }
                }
                DraftAction::Clear { invoice, draft_dir } => {
                    let drafts = FileDraftStore::new(draft_dir);
                    drafts.clear(&invoice).await?;
                    println!("Cleared draft for {}", invoice);
                }
            }
        }
    }

    Ok(())
}

/// The seed is keyed by organization; the CLI addresses invoices by id alone.
async fn find_invoice(
    repo: &MemoryRepository,
    invoice_id: &str,
) -> Result<billsend::invoice::Invoice, BillsendError> {
    repo.find_invoice(invoice_id)
        .await
        .ok_or_else(|| BillsendError::NotFound(format!("invoice {}", invoice_id)))
}

async fn read_overrides(path: &Path) -> Result<DesignOverrides, BillsendError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        BillsendError::InvalidInput(format!("Overrides file {}: {}", path.display(), e))
    })
}
