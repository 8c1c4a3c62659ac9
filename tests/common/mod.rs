//! Shared collaborators for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use flow_wallet_core::blockchain::{
    GeneratedKey, KeyCurve, KeyGenerator, KeySubmitter, LedgerClient, LedgerError, LedgerResult,
    Network, RawAccountKey, TransactionId, TransactionResult,
};
use flow_wallet_core::transactions::{
    MonitorError, Notification, Notifier, TransferIndex, TransferPage, TransferRecord,
};

pub const TX: &str = "8a3c5bd0fa6a1cbe0ac18d5c5b1ae1fbcf4d8ba2cb26c1c0c3e2e7d5c68d0f11";
pub const ADDRESS: &str = "0x01cf0e2f2f715450";

pub fn result(status: &str) -> TransactionResult {
    TransactionResult {
        status: status.to_string(),
        ..Default::default()
    }
}

pub fn raw_key(index: u64, weight: u64, sign: &str, hash: &str, revoked: bool) -> RawAccountKey {
    RawAccountKey {
        index: Some(index),
        public_key: format!("{:0128x}", index + 1),
        weight: Some(weight),
        sign_algo: sign.to_string(),
        hash_algo: hash.to_string(),
        revoked: Some(revoked),
    }
}

pub fn blocto_keys() -> Vec<RawAccountKey> {
    vec![
        raw_key(0, 999, "ECDSA_secp256k1", "SHA3_256", false),
        raw_key(1, 1, "ECDSA_secp256k1", "SHA3_256", false),
    ]
}

/// Scripted ledger.
pub struct MockLedger {
    pub keys: Mutex<LedgerResult<Vec<RawAccountKey>>>,
    pub executed: Mutex<LedgerResult<TransactionResult>>,
    pub sealed: Mutex<LedgerResult<TransactionResult>>,
    /// Returned in order by `transaction_result`; the last one repeats.
    pub results: Mutex<VecDeque<TransactionResult>>,
    /// When set, `once_sealed` waits for a notification first.
    pub sealed_gate: Option<Arc<Notify>>,
    pub account_calls: AtomicU32,
    pub result_calls: AtomicU32,
    pub watch_calls: AtomicU32,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            keys: Mutex::new(Ok(Vec::new())),
            executed: Mutex::new(Ok(result("Executed"))),
            sealed: Mutex::new(Ok(result("Sealed"))),
            results: Mutex::new(VecDeque::new()),
            sealed_gate: None,
            account_calls: AtomicU32::new(0),
            result_calls: AtomicU32::new(0),
            watch_calls: AtomicU32::new(0),
        }
    }
}

impl MockLedger {
    pub fn with_keys(keys: LedgerResult<Vec<RawAccountKey>>) -> Self {
        Self {
            keys: Mutex::new(keys),
            ..Default::default()
        }
    }

    pub fn total_calls(&self) -> u32 {
        self.account_calls.load(Ordering::SeqCst)
            + self.result_calls.load(Ordering::SeqCst)
            + self.watch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn account_keys(&self, _network: Network, _address: &str) -> LedgerResult<Vec<RawAccountKey>> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().clone()
    }

    async fn transaction_result(
        &self,
        _network: Network,
        _tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        if results.len() > 1 {
            Ok(results.pop_front().unwrap())
        } else {
            results
                .front()
                .cloned()
                .ok_or_else(|| LedgerError::Rpc("no scripted result".to_string()))
        }
    }

    async fn once_executed(
        &self,
        _network: Network,
        _tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        self.executed.lock().unwrap().clone()
    }

    async fn once_sealed(
        &self,
        _network: Network,
        _tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.sealed_gate {
            gate.notified().await;
        }
        self.sealed.lock().unwrap().clone()
    }
}

/// Scripted transfer list.
#[derive(Default)]
pub struct MockTransferIndex {
    /// Returned in order; an empty page once exhausted.
    pub pages: Mutex<VecDeque<Result<TransferPage, String>>>,
    pub calls: AtomicU32,
    /// Network of every fetch, in order.
    pub networks: Mutex<Vec<Network>>,
}

impl MockTransferIndex {
    pub fn with_pages(pages: Vec<Result<TransferPage, String>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn page(entries: &[(&str, bool)]) -> TransferPage {
    TransferPage {
        transactions: entries
            .iter()
            .map(|(hash, indexed)| TransferRecord {
                hash: hash.to_string(),
                indexed: *indexed,
                ..Default::default()
            })
            .collect(),
        total: entries.len() as u64,
    }
}

#[async_trait]
impl TransferIndex for MockTransferIndex {
    async fn transfers(
        &self,
        network: Network,
        _address: &str,
        _limit: u32,
        _offset: u32,
    ) -> Result<TransferPage, MonitorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.networks.lock().unwrap().push(network);
        match self.pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(e)) => Err(MonitorError::Indexer(e)),
            None => Ok(TransferPage::default()),
        }
    }
}

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), MonitorError> {
        self.sent.lock().unwrap().push(notification);
        if self.fail {
            return Err(MonitorError::Notification("sink closed".to_string()));
        }
        Ok(())
    }
}

/// Key generator returning a fixed public description.
pub struct StaticKeyGenerator {
    pub public_key: String,
    pub sign_algo: String,
    pub hash_algo: String,
    pub calls: AtomicU32,
}

impl StaticKeyGenerator {
    pub fn new(public_key: &str, sign_algo: &str, hash_algo: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            sign_algo: sign_algo.to_string(),
            hash_algo: hash_algo.to_string(),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl KeyGenerator for StaticKeyGenerator {
    async fn generate(&self, _curve: KeyCurve, _strength: u32) -> LedgerResult<GeneratedKey> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedKey::public_only(
            self.public_key.clone(),
            self.sign_algo.clone(),
            self.hash_algo.clone(),
        ))
    }
}

/// Records submissions and answers with a fixed outcome.
pub struct RecordingSubmitter {
    pub submissions: Mutex<Vec<(Vec<String>, Vec<u64>)>>,
    pub outcome: LedgerResult<TransactionId>,
}

impl RecordingSubmitter {
    pub fn succeeding() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            outcome: Ok(TransactionId::parse(TX).unwrap()),
        }
    }

    pub fn failing(err: LedgerError) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            outcome: Err(err),
        }
    }

    pub fn count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl KeySubmitter for RecordingSubmitter {
    async fn add_and_revoke_keys(
        &self,
        new_public_keys: &[String],
        revoke_indexes: &[u64],
    ) -> LedgerResult<TransactionId> {
        self.submissions
            .lock()
            .unwrap()
            .push((new_public_keys.to_vec(), revoke_indexes.to_vec()));
        self.outcome.clone()
    }
}
