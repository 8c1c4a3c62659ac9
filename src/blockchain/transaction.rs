//! Key management transaction payloads and submission.
//!
//! # Responsibilities
//! - Build the single add-and-revoke-keys transaction (script + arguments)
//! - Define the submission seam used by the rotation service
//!
//! Signing and fee payment belong to the host wallet; it implements
//! [`KeySubmitter`] on top of its own authorizers.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::blockchain::types::{LedgerResult, TransactionId};

/// Cadence transaction that adds every new key and revokes every listed index
/// in one atomic transaction.
pub const ADD_AND_REVOKE_KEYS_CADENCE: &str = r#"
transaction(publicKeys: [String], revokeKeyIndexes: [Int]) {
    prepare(signer: auth(AddKey, RevokeKey) &Account) {
        for publicKey in publicKeys {
            let key = PublicKey(
                publicKey: publicKey.decodeHex(),
                signatureAlgorithm: SignatureAlgorithm.ECDSA_secp256k1
            )
            signer.keys.add(publicKey: key, hashAlgorithm: HashAlgorithm.SHA2_256, weight: 1000.0)
        }
        for keyIndex in revokeKeyIndexes {
            signer.keys.revoke(keyIndex: keyIndex)
        }
    }
}
"#;

/// Submits the atomic add-and-revoke transaction.
#[async_trait]
pub trait KeySubmitter: Send + Sync {
    async fn add_and_revoke_keys(
        &self,
        new_public_keys: &[String],
        revoke_indexes: &[u64],
    ) -> LedgerResult<TransactionId>;
}

/// Payload of an add-and-revoke-keys transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddAndRevokeKeys {
    pub public_keys: Vec<String>,
    pub revoke_indexes: Vec<u64>,
}

impl AddAndRevokeKeys {
    pub fn new(public_keys: Vec<String>, revoke_indexes: Vec<u64>) -> Self {
        Self {
            public_keys,
            revoke_indexes,
        }
    }

    pub fn script(&self) -> &'static str {
        ADD_AND_REVOKE_KEYS_CADENCE
    }

    /// JSON-Cadence arguments in declaration order.
    pub fn arguments(&self) -> Vec<Value> {
        let keys: Vec<Value> = self
            .public_keys
            .iter()
            .map(|k| json!({ "type": "String", "value": k }))
            .collect();
        let indexes: Vec<Value> = self
            .revoke_indexes
            .iter()
            .map(|i| json!({ "type": "Int", "value": i.to_string() }))
            .collect();

        vec![
            json!({ "type": "Array", "value": keys }),
            json!({ "type": "Array", "value": indexes }),
        ]
    }

    /// Arguments base64-encoded as the REST `POST /v1/transactions` body expects.
    pub fn encoded_arguments(&self) -> Vec<String> {
        self.arguments()
            .iter()
            .map(|arg| BASE64.encode(arg.to_string()))
            .collect()
    }

    /// Script base64-encoded for the REST API.
    pub fn encoded_script(&self) -> String {
        BASE64.encode(self.script())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_shape() {
        let tx = AddAndRevokeKeys::new(vec!["ab12".to_string()], vec![0, 1]);
        let args = tx.arguments();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0]["value"][0]["value"], "ab12");
        assert_eq!(args[1]["value"][1], json!({"type": "Int", "value": "1"}));
    }

    #[test]
    fn test_encoded_arguments_decode_back() {
        let tx = AddAndRevokeKeys::new(vec!["ab12".to_string()], vec![3]);
        let encoded = tx.encoded_arguments();
        let decoded: Value = serde_json::from_slice(&BASE64.decode(&encoded[1]).unwrap()).unwrap();
        assert_eq!(decoded["value"][0]["value"], "3");
        assert!(tx.script().contains("signer.keys.revoke"));
    }
}
