//! Legacy Blocto multi-key pattern detection.
//!
//! A Blocto account signs with two secp256k1/SHA3-256 keys: a weight 999
//! key held by the user and a weight 1 key held by the custodian.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{FlowAccountKey, Network};

const BLOCTO_SIGN_ALGO: &str = "ecdsa_secp256k1";
const BLOCTO_HASH_ALGO: &str = "sha3_256";
const USER_KEY_WEIGHT: u64 = 999;
const CUSTODIAN_KEY_WEIGHT: u64 = 1;

/// Outcome of evaluating an account's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloctoDetectionResult {
    pub is_blocto_key: bool,
    pub full_account_keys: Vec<FlowAccountKey>,
    /// Non-revoked pattern keys, in key-list order.
    pub blocto_key_indexes: Vec<u64>,
}

/// Whether a key uses the legacy secp256k1 + SHA3-256 pairing.
pub fn is_blocto_candidate(key: &FlowAccountKey) -> bool {
    key.sign_algo.to_ascii_lowercase().contains(BLOCTO_SIGN_ALGO)
        && key.hash_algo.to_ascii_lowercase().contains(BLOCTO_HASH_ALGO)
}

/// Indexes of non-revoked pattern keys.
pub fn list_revoke_indexes(keys: &[FlowAccountKey]) -> Vec<u64> {
    keys.iter()
        .filter(|k| !k.revoked && is_blocto_candidate(k))
        .map(|k| k.index)
        .collect()
}

/// Pure evaluation of a key list.
///
/// The weight check looks at every candidate, revoked or not; only the
/// returned indexes exclude revoked keys.
pub fn evaluate_keys(keys: Vec<FlowAccountKey>) -> BloctoDetectionResult {
    let candidates: Vec<&FlowAccountKey> = keys.iter().filter(|k| is_blocto_candidate(k)).collect();
    let has_user_key = candidates.iter().any(|k| k.weight == USER_KEY_WEIGHT);
    let has_custodian_key = candidates.iter().any(|k| k.weight == CUSTODIAN_KEY_WEIGHT);
    let blocto_key_indexes = list_revoke_indexes(&keys);

    BloctoDetectionResult {
        is_blocto_key: has_user_key && has_custodian_key,
        full_account_keys: keys,
        blocto_key_indexes,
    }
}

/// Fetches account keys and evaluates them.
#[derive(Clone)]
pub struct BloctoDetector {
    ledger: Arc<dyn LedgerClient>,
    network: Network,
}

impl BloctoDetector {
    pub fn new(ledger: Arc<dyn LedgerClient>, network: Network) -> Self {
        Self { ledger, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Detect the Blocto pattern on `address`.
    ///
    /// A failed key lookup is logged and evaluated as an empty key list.
    pub async fn detect_blocto_key(&self, address: &str) -> BloctoDetectionResult {
        let keys = match self.ledger.account_keys(self.network, address).await {
            Ok(raw) => raw.into_iter().map(FlowAccountKey::from).collect(),
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Failed to fetch account keys");
                Vec::new()
            }
        };

        let result = evaluate_keys(keys);
        tracing::debug!(
            address = %address,
            is_blocto_key = result.is_blocto_key,
            revocable = result.blocto_key_indexes.len(),
            "Evaluated account keys"
        );
        result
    }
}
