//! Pending transaction storage and persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::blockchain::types::Network;
use crate::observability::metrics;
use crate::transactions::types::{PendingKey, PendingTransaction};

/// Errors from a pending store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent owner of pending transaction state.
///
/// Holds at most one record per (network, address); `put` supersedes any
/// earlier record for the same key.
#[async_trait]
pub trait PendingStore: Send + Sync {
    async fn put(&self, record: PendingTransaction) -> StoreResult<()>;

    async fn get(&self, network: Network, address: &str) -> StoreResult<Option<PendingTransaction>>;

    async fn remove(&self, network: Network, address: &str) -> StoreResult<Option<PendingTransaction>>;
}

/// A thread-safe in-memory store with an optional JSON snapshot file.
#[derive(Clone, Default)]
pub struct MemoryPendingStore {
    inner: Arc<DashMap<PendingKey, PendingTransaction>>,
    persistence_path: Option<String>,
    /// One snapshot writer at a time, across all keys.
    snapshot_lock: Arc<Mutex<()>>,
}

impl MemoryPendingStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            snapshot_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load from file if it exists; later mutations are written back to it.
    pub fn load_from_file(path: &str) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let reader = BufReader::new(File::open(path)?);
            let records: Vec<PendingTransaction> = serde_json::from_reader(reader)?;

            for record in records {
                store.inner.insert(record.key(), record);
            }
            metrics::record_pending_size(store.inner.len());
            tracing::info!(count = store.inner.len(), "Loaded pending transactions from file");
        }
        Ok(store)
    }

    /// Write the snapshot file, if configured.
    ///
    /// The snapshot goes to a sibling `.tmp` file first and is renamed into
    /// place, so readers never see a truncated file.
    pub fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            let _guard = self.snapshot_lock.lock().expect("snapshot lock poisoned");
            let records: Vec<PendingTransaction> =
                self.inner.iter().map(|r| r.value().clone()).collect();

            let tmp_path = format!("{}.tmp", path);
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, &records)?;
            writer.flush()?;
            drop(writer);
            fs::rename(&tmp_path, path)?;

            tracing::debug!(count = records.len(), path = %path, "Saved pending transactions");
        }
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// All stored records.
    pub fn all(&self) -> Vec<PendingTransaction> {
        self.inner.iter().map(|r| r.value().clone()).collect()
    }
}

#[async_trait]
impl PendingStore for MemoryPendingStore {
    async fn put(&self, record: PendingTransaction) -> StoreResult<()> {
        self.inner.insert(record.key(), record);
        metrics::record_pending_size(self.inner.len());
        self.save_to_file()
    }

    async fn get(&self, network: Network, address: &str) -> StoreResult<Option<PendingTransaction>> {
        Ok(self
            .inner
            .get(&PendingKey::new(network, address))
            .map(|r| r.value().clone()))
    }

    async fn remove(&self, network: Network, address: &str) -> StoreResult<Option<PendingTransaction>> {
        let removed = self
            .inner
            .remove(&PendingKey::new(network, address))
            .map(|(_, record)| record);
        metrics::record_pending_size(self.inner.len());
        self.save_to_file()?;
        Ok(removed)
    }
}
