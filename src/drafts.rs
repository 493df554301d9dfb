//! # Draft Persistence
//!
//! In-progress design edits, keyed by invoice id, saved so an editor can be
//! closed and reopened without losing work.
//!
//! | Store | Backing | Use |
//! |-------|---------|-----|
//! | [`FileDraftStore`] | one JSON file per invoice | CLI and single-user server |
//! | [`MemoryDraftStore`] | in-process map | tests, ephemeral sessions |
//! | [`NoopDraftStore`] | nothing | non-interactive contexts |
//!
//! [`DraftAutosave`] sits in front of any store and debounces writes: a
//! value is written once no newer value for the same invoice has arrived for
//! [`DraftAutosave::DEBOUNCE`]. Pending values are written on shutdown.
//! Concurrent editors of the same invoice simply overwrite each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::design::DesignOverrides;
use crate::error::BillsendError;

/// Storage for unsaved design overrides.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, invoice_id: &str) -> Result<Option<DesignOverrides>, BillsendError>;

    async fn save(&self, invoice_id: &str, overrides: &DesignOverrides) -> Result<(), BillsendError>;

    async fn clear(&self, invoice_id: &str) -> Result<(), BillsendError>;
}

// ============================================================================
// FILE STORE
// ============================================================================

/// Drafts as `<dir>/<invoice-id>.json`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for an invoice. Ids are reduced to `[A-Za-z0-9_-]` so they
    /// cannot escape the directory.
    pub fn path_for(&self, invoice_id: &str) -> PathBuf {
        let safe: String = invoice_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn load(&self, invoice_id: &str) -> Result<Option<DesignOverrides>, BillsendError> {
        let path = self.path_for(invoice_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(overrides) => Ok(Some(overrides)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable draft");
                Ok(None)
            }
        }
    }

    async fn save(&self, invoice_id: &str, overrides: &DesignOverrides) -> Result<(), BillsendError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(invoice_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(overrides)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "Saved draft");
        Ok(())
    }

    async fn clear(&self, invoice_id: &str) -> Result<(), BillsendError> {
        match tokio::fs::remove_file(self.path_for(invoice_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// MEMORY AND NO-OP STORES
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<String, DesignOverrides>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drafts.read().await.is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, invoice_id: &str) -> Result<Option<DesignOverrides>, BillsendError> {
        Ok(self.drafts.read().await.get(invoice_id).cloned())
    }

    async fn save(&self, invoice_id: &str, overrides: &DesignOverrides) -> Result<(), BillsendError> {
        self.drafts
            .write()
            .await
            .insert(invoice_id.to_string(), overrides.clone());
        Ok(())
    }

    async fn clear(&self, invoice_id: &str) -> Result<(), BillsendError> {
        self.drafts.write().await.remove(invoice_id);
        Ok(())
    }
}

/// Accepts every write and remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDraftStore;

#[async_trait]
impl DraftStore for NoopDraftStore {
    async fn load(&self, _invoice_id: &str) -> Result<Option<DesignOverrides>, BillsendError> {
        Ok(None)
    }

    async fn save(&self, _invoice_id: &str, _overrides: &DesignOverrides) -> Result<(), BillsendError> {
        Ok(())
    }

    async fn clear(&self, _invoice_id: &str) -> Result<(), BillsendError> {
        Ok(())
    }
}

// ============================================================================
// DEBOUNCED AUTOSAVE
// ============================================================================

enum Command {
    Save(String, DesignOverrides),
    Flush(oneshot::Sender<()>),
}

/// Trailing-edge debounced writer in front of a [`DraftStore`].
///
/// [`push`](Self::push) never blocks; a background task owns the timer and
/// the store. Write failures are logged and dropped.
pub struct DraftAutosave {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl DraftAutosave {
    /// Quiet period before a pending value is written.
    pub const DEBOUNCE: Duration = Duration::from_millis(300);

    /// Start the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn DraftStore>) -> Self {
        Self::with_delay(store, Self::DEBOUNCE)
    }

    pub fn with_delay(store: Arc<dyn DraftStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, rx, delay));
        Self { tx, task }
    }

    /// Queue a value; restarts the quiet period.
    pub fn push(&self, invoice_id: &str, overrides: DesignOverrides) {
        if self
            .tx
            .send(Command::Save(invoice_id.to_string(), overrides))
            .is_err()
        {
            warn!(invoice_id, "Autosave task is gone; draft not saved");
        }
    }

    /// Write anything pending now.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Write anything pending and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Autosave task failed");
        }
    }
}

async fn run(
    store: Arc<dyn DraftStore>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    delay: Duration,
) {
    let mut pending: HashMap<String, DesignOverrides> = HashMap::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => {
                tokio::select! {
                    command = rx.recv() => command,
                    _ = tokio::time::sleep_until(at) => {
                        write_pending(store.as_ref(), &mut pending).await;
                        deadline = None;
                        continue;
                    }
                }
            }
            None => rx.recv().await,
        };

        match command {
            Some(Command::Save(invoice_id, overrides)) => {
                pending.insert(invoice_id, overrides);
                deadline = Some(Instant::now() + delay);
            }
            Some(Command::Flush(done)) => {
                write_pending(store.as_ref(), &mut pending).await;
                deadline = None;
                let _ = done.send(());
            }
            None => {
                write_pending(store.as_ref(), &mut pending).await;
                break;
            }
        }
    }
}

async fn write_pending(store: &dyn DraftStore, pending: &mut HashMap<String, DesignOverrides>) {
    for (invoice_id, overrides) in pending.drain() {
        if let Err(e) = store.save(&invoice_id, &overrides).await {
            warn!(invoice_id = %invoice_id, error = %e, "Failed to save draft");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{HexColor, PartialStyleTokens};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn overrides(accent: &str) -> DesignOverrides {
        DesignOverrides {
            template_id: "classic".into(),
            tokens: PartialStyleTokens {
                accent_color_hex: HexColor::parse(accent),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryDraftStore,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl DraftStore for CountingStore {
        async fn load(&self, id: &str) -> Result<Option<DesignOverrides>, BillsendError> {
            self.inner.load(id).await
        }

        async fn save(&self, id: &str, o: &DesignOverrides) -> Result<(), BillsendError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(id, o).await
        }

        async fn clear(&self, id: &str) -> Result<(), BillsendError> {
            self.inner.clear(id).await
        }
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        assert_eq!(store.load("inv_1").await.unwrap(), None);

        store.save("inv_1", &overrides("#ff0000")).await.unwrap();
        assert_eq!(store.load("inv_1").await.unwrap(), Some(overrides("#ff0000")));

        store.clear("inv_1").await.unwrap();
        assert_eq!(store.load("inv_1").await.unwrap(), None);
        // clearing twice is fine
        store.clear("inv_1").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_corrupt_draft_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        std::fs::write(store.path_for("inv_1"), b"{not json").unwrap();
        assert_eq!(store.load("inv_1").await.unwrap(), None);
    }

    #[test]
    fn test_file_store_path_stays_in_dir() {
        let store = FileDraftStore::new("/tmp/drafts");
        let path = store.path_for("../../etc/passwd");
        assert_eq!(path.parent().unwrap(), Path::new("/tmp/drafts"));
        assert_eq!(path.file_name().unwrap(), "______etc_passwd.json");
    }

    #[tokio::test]
    async fn test_noop_store() {
        let store = NoopDraftStore;
        store.save("inv_1", &overrides("#ff0000")).await.unwrap();
        assert_eq!(store.load("inv_1").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_coalesces_bursts() {
        let store = Arc::new(CountingStore::default());
        let autosave = DraftAutosave::spawn(store.clone());

        autosave.push("inv_1", overrides("#111111"));
        sleep(Duration::from_millis(100)).await;
        autosave.push("inv_1", overrides("#222222"));
        sleep(Duration::from_millis(100)).await;
        autosave.push("inv_1", overrides("#333333"));

        sleep(Duration::from_millis(250)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert_eq!(store.load("inv_1").await.unwrap(), Some(overrides("#333333")));

        autosave.shutdown().await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_flushes_on_shutdown() {
        let store = Arc::new(CountingStore::default());
        let autosave = DraftAutosave::spawn(store.clone());
        autosave.push("inv_1", overrides("#ff0000"));
        autosave.shutdown().await;
        assert_eq!(store.load("inv_1").await.unwrap(), Some(overrides("#ff0000")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_explicit_flush() {
        let store = Arc::new(CountingStore::default());
        let autosave = DraftAutosave::spawn(store.clone());
        autosave.push("inv_1", overrides("#ff0000"));
        autosave.push("inv_2", overrides("#00ff00"));
        autosave.flush().await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner.len().await, 2);
    }
}
