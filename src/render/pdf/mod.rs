//! # PDF Rendering
//!
//! ```text
//! DocumentPlan ──► layout() ──► Layout (pages of PdfOp) ──► write_pdf() ──► bytes
//!                     ▲                                         ▲
//!              Helvetica metrics                         optional LogoImage
//! ```
//!
//! Assembly itself is synchronous and deterministic. The [`PdfBackend`]
//! trait wraps it for the server, where producing a PDF may involve network
//! I/O (fetching the logo, or delegating to an external rendering service),
//! and [`render_pdf`] bounds any backend with a timeout.
//!
//! | Backend | What it does |
//! |---------|--------------|
//! | [`LocalPdf`] | Fetches the logo with `reqwest`, assembles in-process |
//! | [`RemotePdf`] | Posts the print HTML to an external service, returns its bytes |

pub mod layout;
mod metrics;
mod writer;

pub use layout::{Layout, PageLayout, PdfOp, layout};
pub use metrics::{text_width, wrap};
pub use writer::write_pdf;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::design::ResolvedStyle;
use crate::error::BillsendError;
use crate::invoice::{Invoice, Organization, pdf_filename};
use crate::plan::{Block, DocumentPlan};
use crate::render::html::{HtmlMode, render_html};

/// Upper bound on producing one PDF.
pub const DEFAULT_PDF_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// LOGO IMAGE
// ============================================================================

/// A decoded logo, flattened onto white as 8-bit RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl LogoImage {
    /// Decode PNG/JPEG/etc. bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, BillsendError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| BillsendError::Upstream(format!("Failed to decode logo: {}", e)))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as u32;
            for channel in [r, g, b] {
                rgb.push(((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8);
            }
        }
        Ok(Self { width, height, rgb })
    }
}

/// Assemble a PDF from a plan without any I/O.
pub fn render_document(plan: &DocumentPlan, logo: Option<&LogoImage>) -> Result<Vec<u8>, BillsendError> {
    let layout = layout(plan, logo.map(|l| (l.width, l.height)));
    write_pdf(&layout, logo, &document_title(plan))
}

fn document_title(plan: &DocumentPlan) -> String {
    plan.blocks
        .iter()
        .find_map(|b| match b {
            Block::Header(h) => h.meta.first().map(|(_, number)| format!("Invoice {}", number)),
            _ => None,
        })
        .unwrap_or_else(|| "Invoice".to_string())
}

// ============================================================================
// BACKENDS
// ============================================================================

/// Everything a backend needs to produce one PDF.
#[derive(Debug, Clone)]
pub struct PdfJob {
    pub plan: DocumentPlan,
    pub filename: String,
}

impl PdfJob {
    pub fn new(
        invoice: &Invoice,
        organization: &Organization,
        style: &ResolvedStyle,
    ) -> Result<Self, BillsendError> {
        Ok(Self {
            plan: DocumentPlan::build(invoice, organization, style)?,
            filename: pdf_filename(invoice.issue_date, &invoice.client.name, &invoice.number),
        })
    }

    fn logo_url(&self) -> Option<&str> {
        self.plan.blocks.iter().find_map(|b| match b {
            Block::Header(h) => h.logo_url.as_deref(),
            _ => None,
        })
    }
}

/// Something that can turn a [`PdfJob`] into PDF bytes.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn render(&self, job: &PdfJob) -> Result<Vec<u8>, BillsendError>;
}

/// Run a backend with a time bound.
///
/// On expiry the backend future is dropped, which aborts any request it has
/// in flight, and [`BillsendError::Timeout`] is returned.
pub async fn render_pdf(
    backend: &dyn PdfBackend,
    job: &PdfJob,
    limit: Duration,
) -> Result<Vec<u8>, BillsendError> {
    match tokio::time::timeout(limit, backend.render(job)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                backend = backend.name(),
                filename = %job.filename,
                seconds = limit.as_secs(),
                "PDF rendering timed out"
            );
            Err(BillsendError::Timeout {
                seconds: limit.as_secs(),
            })
        }
    }
}

fn http_client() -> Result<reqwest::Client, BillsendError> {
    reqwest::Client::builder()
        .user_agent(concat!("billsend/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| BillsendError::Config(format!("HTTP client error: {}", e)))
}

/// Decoded logos by URL, oldest evicted first once full.
#[derive(Debug)]
struct LogoCache {
    limit: usize,
    entries: HashMap<String, Arc<LogoImage>>,
    order: VecDeque<String>,
}

impl LogoCache {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, url: &str) -> Option<Arc<LogoImage>> {
        self.entries.get(url).cloned()
    }

    fn insert(&mut self, url: &str, logo: Arc<LogoImage>) {
        if self.entries.insert(url.to_string(), logo).is_some() {
            return;
        }
        self.order.push_back(url.to_string());
        while self.order.len() > self.limit {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(url = %oldest, "Evicted logo");
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// In-process assembly. Logos are fetched once per URL and cached.
pub struct LocalPdf {
    http_client: reqwest::Client,
    logo_cache: Arc<RwLock<LogoCache>>,
}

impl LocalPdf {
    pub fn new() -> Result<Self, BillsendError> {
        Ok(Self::with_client(http_client()?))
    }

    /// Most logos kept decoded at once.
    pub const LOGO_CACHE_LIMIT: usize = 64;

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            logo_cache: Arc::new(RwLock::new(LogoCache::new(Self::LOGO_CACHE_LIMIT))),
        }
    }

    async fn fetch_logo(&self, url: &str) -> Result<Arc<LogoImage>, BillsendError> {
        if let Some(logo) = self.logo_cache.read().await.get(url) {
            return Ok(logo);
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| BillsendError::Upstream(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(BillsendError::Upstream(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BillsendError::Upstream(format!("Failed to read logo data: {}", e)))?;

        let logo = Arc::new(LogoImage::decode(&bytes)?);
        self.logo_cache.write().await.insert(url, logo.clone());
        debug!(url, width = logo.width, height = logo.height, "Cached logo");
        Ok(logo)
    }
}

#[async_trait]
impl PdfBackend for LocalPdf {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn render(&self, job: &PdfJob) -> Result<Vec<u8>, BillsendError> {
        let logo = match job.logo_url() {
            Some(url) => match self.fetch_logo(url).await {
                Ok(logo) => Some(logo),
                Err(e) => {
                    warn!(url, error = %e, "Logo unavailable, rendering without it");
                    None
                }
            },
            None => None,
        };
        // Layout and assembly are CPU-bound; keep them off the async workers.
        let plan = job.plan.clone();
        let bytes = tokio::task::spawn_blocking(move || render_document(&plan, logo.as_deref()))
            .await
            .map_err(|e| BillsendError::Render(format!("PDF assembly task failed: {}", e)))??;
        info!(filename = %job.filename, size = bytes.len(), "Rendered PDF");
        Ok(bytes)
    }
}

/// Delegates to an external HTML-to-PDF service.
///
/// Request: `POST <endpoint>` with `{"html", "pageSize", "filename"}`.
/// Response: the PDF bytes.
pub struct RemotePdf {
    http_client: reqwest::Client,
    endpoint: String,
}

impl RemotePdf {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, BillsendError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(BillsendError::Config(
                "remote PDF backend requires an endpoint".to_string(),
            ));
        }
        Ok(Self {
            http_client: http_client()?,
            endpoint,
        })
    }
}

#[async_trait]
impl PdfBackend for RemotePdf {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn render(&self, job: &PdfJob) -> Result<Vec<u8>, BillsendError> {
        let body = serde_json::json!({
            "html": render_html(&job.plan, HtmlMode::Print),
            "pageSize": job.plan.style.tokens.page_size,
            "filename": job.filename,
        });
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| BillsendError::Upstream(format!("PDF service request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(BillsendError::Upstream(format!(
                "PDF service returned HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BillsendError::Upstream(format!("Failed to read PDF body: {}", e)))?;
        info!(filename = %job.filename, size = bytes.len(), "Received PDF from service");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{presets, resolve};
    use crate::invoice::{Client, LineItem};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn job(items: usize, logo_url: Option<&str>) -> PdfJob {
        let invoice = Invoice {
            id: "inv_1".into(),
            organization_id: "org_1".into(),
            number: "INV-0001".into(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
            currency: "GBP".into(),
            client: Client {
                name: "Acme".into(),
                ..Default::default()
            },
            items: (0..items)
                .map(|i| LineItem::new(format!("Item {}", i), dec!(1), dec!(10)))
                .collect(),
            tax_rate: dec!(20),
            discount_rate: dec!(0),
            notes: None,
            terms: None,
            payment_details: None,
            template_id: "classic".into(),
            design_snapshot: None,
        };
        let org = Organization {
            id: "org_1".into(),
            name: "Studio".into(),
            logo_url: logo_url.map(String::from),
            ..Default::default()
        };
        let style = resolve(presets::by_id_or_default("classic"), None);
        PdfJob::new(&invoice, &org, &style).unwrap()
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct SlowBackend;

    #[async_trait]
    impl PdfBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn render(&self, _job: &PdfJob) -> Result<Vec<u8>, BillsendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl PdfBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn render(&self, _job: &PdfJob) -> Result<Vec<u8>, BillsendError> {
            Err(BillsendError::Upstream("boom".into()))
        }
    }

    #[test]
    fn test_document_is_pdf_with_totals() {
        let bytes = render_document(&job(2, None).plan, None).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(contains(&bytes, "GBP 20.00"));
        assert!(contains(&bytes, "GBP 24.00"));
        assert!(contains(&bytes, "/Helvetica-Bold"));
    }

    #[test]
    fn test_page_counts() {
        let short = lopdf::Document::load_mem(&render_document(&job(3, None).plan, None).unwrap()).unwrap();
        assert_eq!(short.get_pages().len(), 1);

        let long = lopdf::Document::load_mem(&render_document(&job(200, None).plan, None).unwrap()).unwrap();
        assert!(long.get_pages().len() > 1);
    }

    #[test]
    fn test_logo_decode_flattens_alpha() {
        let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let logo = LogoImage::decode(&bytes).unwrap();
        assert_eq!(logo.rgb, vec![255, 255, 255]);
    }

    #[test]
    fn test_logo_embedded_as_xobject() {
        let job = job(1, Some("https://cdn.test/logo.png"));
        let logo = LogoImage::decode(&png_bytes()).unwrap();
        let bytes = render_document(&job.plan, Some(&logo)).unwrap();
        assert!(contains(&bytes, "/XObject"));
        assert!(contains(&bytes, "/Im1 Do"));
    }

    #[test]
    fn test_logo_decode_rejects_garbage() {
        assert!(LogoImage::decode(b"not an image").is_err());
    }

    #[test]
    fn test_filename_from_invoice() {
        assert_eq!(job(1, None).filename, "2025-03-05-acme-inv-0001.pdf");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinguishable() {
        let err = render_pdf(&SlowBackend, &job(1, None), DEFAULT_PDF_TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, BillsendError::Timeout { seconds: 60 }));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_timeout() {
        let err = render_pdf(&FailingBackend, &job(1, None), DEFAULT_PDF_TIMEOUT)
            .await
            .unwrap_err();
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_local_backend_without_logo() {
        let backend = LocalPdf::new().unwrap();
        let bytes = render_pdf(&backend, &job(2, None), DEFAULT_PDF_TIMEOUT)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_local_backend_omits_unreachable_logo() {
        let backend = LocalPdf::new().unwrap();
        let bytes = render_pdf(
            &backend,
            &job(2, Some("http://127.0.0.1:9/logo.png")),
            DEFAULT_PDF_TIMEOUT,
        )
        .await
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!contains(&bytes, "/Im1 Do"));
    }

    #[tokio::test]
    async fn test_local_backend_uses_cached_logo() {
        let backend = LocalPdf::new().unwrap();
        let url = "http://127.0.0.1:9/cached.png";
        let logo = Arc::new(LogoImage::decode(&png_bytes()).unwrap());
        backend.logo_cache.write().await.insert(url, logo);

        let bytes = render_pdf(&backend, &job(2, Some(url)), DEFAULT_PDF_TIMEOUT)
            .await
            .unwrap();
        assert!(contains(&bytes, "/Im1 Do"));
    }

    #[test]
    fn test_logo_cache_evicts_oldest() {
        let logo = Arc::new(LogoImage::decode(&png_bytes()).unwrap());
        let mut cache = LogoCache::new(2);
        cache.insert("a", logo.clone());
        cache.insert("b", logo.clone());
        cache.insert("a", logo.clone());
        assert_eq!(cache.len(), 2);

        cache.insert("c", logo.clone());
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());

        let mut full = LogoCache::new(LocalPdf::LOGO_CACHE_LIMIT);
        for i in 0..LocalPdf::LOGO_CACHE_LIMIT * 2 {
            full.insert(&format!("https://cdn.test/{}.png", i), logo.clone());
        }
        assert_eq!(full.len(), LocalPdf::LOGO_CACHE_LIMIT);
    }

    #[test]
    fn test_remote_requires_endpoint() {
        assert!(matches!(RemotePdf::new("  "), Err(BillsendError::Config(_))));
    }
}
