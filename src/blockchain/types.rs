//! Ledger-specific types and error definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Flow network the wallet is connected to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Emulator,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Emulator => "emulator",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "emulator" => Ok(Network::Emulator),
            other => Err(LedgerError::Message(format!("unknown network '{}'", other))),
        }
    }
}

/// Kind of account currently selected in the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Main,
    Child,
    /// Account on the EVM-compatible sub-ledger.
    Evm,
}

/// A 64 hex character ledger transaction id, stored lower-case without prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Parse an id, accepting an optional `0x` prefix.
    ///
    /// Returns `None` for anything that is not exactly 64 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.strip_prefix("0x").unwrap_or(raw);
        if hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(hex.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Transport-level failure talking to the access node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Non-success HTTP status from a REST endpoint.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request timed out.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// The ledger reported a failed transaction with a structured code.
    #[error("[Error Code: {code}] {message}")]
    Transaction { code: u64, message: String },

    /// A watch gave up before the transaction reached the wanted stage.
    #[error("transaction {tx_id} not {stage} after {attempts} checks")]
    WatchExhausted {
        tx_id: String,
        stage: &'static str,
        attempts: u32,
    },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Key generation or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Plain message error without a code.
    #[error("{0}")]
    Message(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Extract `N` from an embedded `[Error Code: N]` marker.
///
/// Best-effort only: the marker is free text produced by the node, so a
/// missing or malformed marker yields `None`.
pub fn extract_error_code(message: &str) -> Option<u64> {
    const MARKER: &str = "[Error Code:";
    let start = message.find(MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = rest.find(']')?;
    rest[..end].trim().parse().ok()
}

/// Transaction result document returned by `GET /v1/transaction_results/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    #[serde(default)]
    pub block_id: String,
    /// Pending, Finalized, Executed, Sealed or Expired.
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub status_code: u64,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub execution: Option<String>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl TransactionResult {
    pub fn is_sealed(&self) -> bool {
        self.status == "Sealed"
    }

    /// True once computation has run (Executed or Sealed).
    pub fn is_executed(&self) -> bool {
        self.status == "Executed" || self.is_sealed()
    }

    pub fn is_expired(&self) -> bool {
        self.status == "Expired"
    }

    /// The failure carried by this document, if any.
    pub fn failure(&self) -> Option<LedgerError> {
        if !self.error_message.is_empty() || self.status_code != 0 {
            let code = if self.status_code != 0 {
                self.status_code
            } else {
                extract_error_code(&self.error_message).unwrap_or_default()
            };
            return Some(LedgerError::Transaction {
                code,
                message: self.error_message.clone(),
            });
        }
        if self.is_expired() {
            return Some(LedgerError::Message("transaction expired".to_string()));
        }
        None
    }
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub transaction_id: String,
    /// Base64 JSON-Cadence payload as sent by the node.
    #[serde(default)]
    pub payload: String,
    /// Decoded payload fields.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Account key as reported by the ledger, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAccountKey {
    #[serde(default, alias = "keyId", deserialize_with = "lenient_opt_u64")]
    pub index: Option<u64>,
    #[serde(default, alias = "publicKey")]
    pub public_key: String,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub weight: Option<u64>,
    #[serde(default, alias = "signAlgoString", alias = "signing_algorithm")]
    pub sign_algo: String,
    #[serde(default, alias = "hashAlgoString", alias = "hashing_algorithm")]
    pub hash_algo: String,
    #[serde(default)]
    pub revoked: Option<bool>,
}

/// Normalized account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowAccountKey {
    pub index: u64,
    pub public_key: String,
    pub weight: u64,
    pub sign_algo: String,
    pub hash_algo: String,
    pub revoked: bool,
}

impl From<RawAccountKey> for FlowAccountKey {
    fn from(raw: RawAccountKey) -> Self {
        Self {
            index: raw.index.unwrap_or(0),
            public_key: raw.public_key,
            weight: raw.weight.unwrap_or(0),
            sign_algo: raw.sign_algo,
            hash_algo: raw.hash_algo,
            revoked: raw.revoked.unwrap_or(false),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, got '{}'", s))),
        }
    }
}

// The REST API encodes u64 fields as strings; FCL-decoded documents use numbers.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_u64()
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_u64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX: &str = "8a3c5bd0fa6a1cbe0ac18d5c5b1ae1fbcf4d8ba2cb26c1c0c3e2e7d5c68d0f11";

    #[test]
    fn test_transaction_id_shape() {
        assert!(TransactionId::parse(TX).is_some());
        let prefixed = TransactionId::parse(&format!("0x{}", TX.to_uppercase())).unwrap();
        assert_eq!(prefixed.as_str(), TX);
        assert!(TransactionId::parse("not-a-tx-id").is_none());
        assert!(TransactionId::parse(&TX[1..]).is_none());
        assert!(TransactionId::parse(&format!("{}zz", &TX[2..])).is_none());
    }

    #[test]
    fn test_extract_error_code() {
        assert_eq!(
            extract_error_code("[Error Code: 1101] cadence runtime error"),
            Some(1101)
        );
        assert_eq!(extract_error_code("execution reverted"), None);
        assert_eq!(extract_error_code("[Error Code: abc]"), None);
    }

    #[test]
    fn test_rest_key_normalization() {
        let raw: RawAccountKey = serde_json::from_value(serde_json::json!({
            "index": "1",
            "public_key": "0xabc",
            "signing_algorithm": "ECDSA_secp256k1",
            "hashing_algorithm": "SHA3_256",
            "sequence_number": "4",
            "weight": "999",
            "revoked": false
        }))
        .unwrap();
        let key = FlowAccountKey::from(raw);
        assert_eq!(key.index, 1);
        assert_eq!(key.weight, 999);
        assert_eq!(key.hash_algo, "SHA3_256");
    }

    #[test]
    fn test_missing_fields_default() {
        let raw: RawAccountKey = serde_json::from_value(serde_json::json!({
            "keyId": 3,
            "publicKey": "abc",
            "signAlgoString": "ECDSA_P256",
            "hashAlgoString": "SHA2_256"
        }))
        .unwrap();
        let key = FlowAccountKey::from(raw);
        assert_eq!(key.index, 3);
        assert_eq!(key.weight, 0);
        assert!(!key.revoked);

        let empty = FlowAccountKey::from(RawAccountKey::default());
        assert_eq!(empty.index, 0);
    }

    #[test]
    fn test_result_failure() {
        let ok = TransactionResult {
            status: "Sealed".to_string(),
            ..Default::default()
        };
        assert!(ok.is_executed());
        assert!(ok.failure().is_none());

        let failed: TransactionResult = serde_json::from_value(serde_json::json!({
            "status": "Executed",
            "status_code": "1",
            "error_message": "[Error Code: 1101] panic"
        }))
        .unwrap();
        assert_eq!(
            failed.failure(),
            Some(LedgerError::Transaction {
                code: 1,
                message: "[Error Code: 1101] panic".to_string()
            })
        );

        let coded = TransactionResult {
            error_message: "[Error Code: 1007] invalid proposal key".to_string(),
            ..Default::default()
        };
        assert!(matches!(coded.failure(), Some(LedgerError::Transaction { code: 1007, .. })));
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
        assert_eq!(Network::Emulator.to_string(), "emulator");
    }
}
