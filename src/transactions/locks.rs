//! Per-(network, address) mutual exclusion for pending store writes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::blockchain::types::Network;
use crate::transactions::types::PendingKey;

/// Keyed async mutex.
///
/// Read-check-write sequences against the pending store run while holding
/// the guard for their key, so `clear_pending` and concurrent watches on the
/// same pair serialize. An entry lives only while someone holds or waits on
/// its key.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<DashMap<PendingKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(network, address)`.
    pub async fn lock(&self, network: Network, address: &str) -> KeyGuard {
        let key = PendingKey::new(network, address);
        let mutex = self.inner.entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            guard: Some(guard),
            key,
            inner: self.inner.clone(),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one key; drops the map entry on release when idle.
pub struct KeyGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: PendingKey,
    inner: Arc<DashMap<PendingKey, Arc<Mutex<()>>>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Clones are taken under the shard lock, so a count of one means no
        // waiter can still reach this mutex.
        self.inner
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
