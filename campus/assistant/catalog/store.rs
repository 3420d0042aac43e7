use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::{Mutex, RwLock};
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    catalog::{
        record::UniversityRecord,
        snapshot::CatalogSnapshot,
        source::CatalogSource,
    },
    errors::CatalogResult,
    telemetry::AssistantTelemetry,
};

/// Owned handle over the current catalog snapshot.
///
/// Readers take an `Arc` of the snapshot and never block a rebuild for longer
/// than the pointer swap. Writers (rebuild, replace, file creation) run one at
/// a time, so the installed snapshot always reflects the last file written.
/// Every swap bumps the version, including the swap to an empty snapshot after
/// a failed load.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    source: CatalogSource,
    current: RwLock<Arc<CatalogSnapshot>>,
    writer: Mutex<()>,
    version: AtomicU64,
    telemetry: Option<AssistantTelemetry>,
}

impl CatalogStore {
    /// Creates a store holding an empty snapshot at version 0. Call
    /// [`CatalogStore::rebuild`] to load the source.
    #[must_use]
    pub fn new(source: CatalogSource, telemetry: Option<AssistantTelemetry>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                source,
                current: RwLock::new(Arc::new(CatalogSnapshot::empty(0))),
                writer: Mutex::new(()),
                version: AtomicU64::new(0),
                telemetry,
            }),
        }
    }

    /// Catalog file backing this store.
    #[must_use]
    pub fn source(&self) -> &CatalogSource {
        &self.inner.source
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.inner.current.read())
    }

    /// Version of the installed snapshot.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Re-reads the source and swaps in a fresh snapshot.
    ///
    /// On a read or parse failure the store falls back to an empty snapshot and
    /// the error is returned; the previous records are not kept.
    pub fn rebuild(&self) -> CatalogResult<usize> {
        let _writer = self.inner.writer.lock();
        self.reload()
    }

    /// Admin update: writes `records` over the source, then rebuilds.
    pub fn replace(&self, records: &[UniversityRecord]) -> CatalogResult<usize> {
        let _writer = self.inner.writer.lock();
        let written = match self.inner.source.replace(records) {
            Ok(written) => written,
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "catalog.replace.rejected",
                    json!({ "kind": err.kind(), "error": err.to_string() }),
                );
                return Err(err);
            }
        };
        self.log(
            LogLevel::Info,
            "catalog.replace.written",
            json!({ "universities": written }),
        );
        self.reload()
    }

    /// Creates the source holding an empty array when it is missing, then rebuilds.
    pub fn ensure_source(&self) -> CatalogResult<usize> {
        let _writer = self.inner.writer.lock();
        self.inner.source.ensure_exists()?;
        self.reload()
    }

    fn reload(&self) -> CatalogResult<usize> {
        match self.inner.source.load() {
            Ok(records) => {
                let snapshot = self.install(records);
                self.log(
                    LogLevel::Info,
                    "catalog.rebuild.complete",
                    json!({
                        "version": snapshot.version(),
                        "universities": snapshot.len(),
                        "loaded_at": snapshot.loaded_at(),
                        "path": self.inner.source.path(),
                    }),
                );
                Ok(snapshot.len())
            }
            Err(err) => {
                let snapshot = self.install(Vec::new());
                self.log(
                    LogLevel::Error,
                    "catalog.rebuild.failed",
                    json!({
                        "version": snapshot.version(),
                        "kind": err.kind(),
                        "error": err.to_string(),
                    }),
                );
                Err(err)
            }
        }
    }

    fn install(&self, records: Vec<UniversityRecord>) -> Arc<CatalogSnapshot> {
        let mut current = self.inner.current.write();
        let version = self.inner.version.fetch_add(1, Ordering::AcqRel) + 1;
        *current = Arc::new(CatalogSnapshot::new(records, version));
        Arc::clone(&current)
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = &self.inner.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}
