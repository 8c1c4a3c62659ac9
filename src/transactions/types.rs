//! Transaction monitoring types.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::blockchain::types::{Network, TransactionId};

/// Lifecycle stage of a tracked transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Submitted,
    Executed,
    Sealed,
    Error,
}

/// Store key: one active pending record per (network, address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub network: Network,
    pub address: String,
}

impl PendingKey {
    pub fn new(network: Network, address: &str) -> Self {
        Self {
            network,
            address: address.to_ascii_lowercase(),
        }
    }
}

/// A transaction the wallet is watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub network: Network,
    pub address: String,
    pub tx_id: TransactionId,
    pub icon: String,
    pub title: String,
    pub status: TxStatus,
    /// Transaction hash once the ledger has resolved it.
    pub hash: Option<String>,
    /// Unix seconds of the last status change.
    pub updated_at: u64,
}

impl PendingTransaction {
    /// A freshly submitted record.
    pub fn submitted(
        network: Network,
        address: &str,
        tx_id: TransactionId,
        display: &TransactionDisplay,
    ) -> Self {
        Self {
            network,
            address: address.to_string(),
            tx_id,
            icon: display.icon.clone(),
            title: display.title.clone(),
            status: TxStatus::Submitted,
            hash: None,
            updated_at: unix_now(),
        }
    }

    pub fn key(&self) -> PendingKey {
        PendingKey::new(self.network, &self.address)
    }

    /// Move to `status`, recording the hash when one is known.
    pub fn advance(&mut self, status: TxStatus, hash: Option<String>) {
        self.status = status;
        if hash.is_some() {
            self.hash = hash;
        }
        self.updated_at = unix_now();
    }
}

/// Presentation strings attached to a watched transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDisplay {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Key of a balance cache entry that must be refetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub network: Network,
    pub address: String,
    pub currency: String,
}

/// Deep-link notification for an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub url: String,
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Events broadcast by the monitor to the presentation layer and caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A tracked record changed stage.
    StatusChanged {
        tx_id: TransactionId,
        status: TxStatus,
    },
    /// Dependent balance caches must refetch.
    BalanceInvalidated(BalanceKey),
    /// A watch failed; the caller never sees an error directly.
    TransactionError {
        error_message: String,
        error_code: Option<u64>,
    },
}

/// One entry of the indexer's transfer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time: Option<String>,
}

/// A page of the transfer list, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPage {
    #[serde(default)]
    pub transactions: Vec<TransferRecord>,
    #[serde(default)]
    pub total: u64,
}

/// Strip a `0x` prefix and lower-case a hash for comparison.
pub fn normalize_hash(hash: &str) -> String {
    hash.trim()
        .strip_prefix("0x")
        .unwrap_or(hash.trim())
        .to_ascii_lowercase()
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX: &str = "8a3c5bd0fa6a1cbe0ac18d5c5b1ae1fbcf4d8ba2cb26c1c0c3e2e7d5c68d0f11";

    #[test]
    fn test_pending_serde() {
        let record = PendingTransaction::submitted(
            Network::Testnet,
            "0x01cf0e2f2f715450",
            TransactionId::parse(TX).unwrap(),
            &TransactionDisplay {
                title: "Send FLOW".to_string(),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["network"], "testnet");
        assert_eq!(json["tx_id"], TX);
    }

    #[test]
    fn test_advance_keeps_hash() {
        let mut record = PendingTransaction::submitted(
            Network::Mainnet,
            "0x1",
            TransactionId::parse(TX).unwrap(),
            &TransactionDisplay::default(),
        );
        record.advance(TxStatus::Executed, Some(TX.to_string()));
        record.advance(TxStatus::Sealed, None);
        assert_eq!(record.status, TxStatus::Sealed);
        assert_eq!(record.hash.as_deref(), Some(TX));
    }

    #[test]
    fn test_pending_key_case_insensitive() {
        assert_eq!(
            PendingKey::new(Network::Mainnet, "0xABC"),
            PendingKey::new(Network::Mainnet, "0xabc")
        );
    }

    #[test]
    fn test_normalize_hash() {
        assert_eq!(normalize_hash("0xABcd"), "abcd");
        assert_eq!(normalize_hash(" abcd "), "abcd");
    }
}
