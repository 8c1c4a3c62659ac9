//! Account key generation.
//!
//! # Security
//! - Private keys are never logged or serialized
//! - `Debug` output shows only the public half

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::blockchain::types::{LedgerError, LedgerResult};

/// Signature algorithm label reported for secp256k1 keys.
pub const SIGN_ALGO_SECP256K1: &str = "ECDSA_secp256k1";

/// Hash algorithm paired with newly generated keys.
pub const HASH_ALGO_SHA2_256: &str = "SHA2_256";

/// Curve requested from a key generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCurve {
    Secp256k1,
    P256,
}

/// A freshly generated account key.
pub struct GeneratedKey {
    /// Uncompressed public key hex (64 bytes, no SEC1 tag), possibly `0x` prefixed.
    pub public_key: String,
    pub sign_algo: String,
    pub hash_algo: String,
    signer: Option<PrivateKeySigner>,
}

impl GeneratedKey {
    /// A key description without private material.
    pub fn public_only(
        public_key: impl Into<String>,
        sign_algo: impl Into<String>,
        hash_algo: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            sign_algo: sign_algo.into(),
            hash_algo: hash_algo.into(),
            signer: None,
        }
    }

    /// Wrap a local secp256k1 signer.
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let point = signer.credential().verifying_key().to_encoded_point(false);
        let public_key = alloy::primitives::hex::encode(&point.as_bytes()[1..]);
        Self {
            public_key,
            sign_algo: SIGN_ALGO_SECP256K1.to_string(),
            hash_algo: HASH_ALGO_SHA2_256.to_string(),
            signer: Some(signer),
        }
    }

    /// Signer holding the private key, when generated locally.
    pub fn signer(&self) -> Option<&PrivateKeySigner> {
        self.signer.as_ref()
    }

    /// EVM address derived from the same secp256k1 key.
    pub fn evm_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }
}

impl std::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("public_key", &self.public_key)
            .field("sign_algo", &self.sign_algo)
            .field("hash_algo", &self.hash_algo)
            .finish_non_exhaustive()
    }
}

/// Source of new account keys.
#[async_trait]
pub trait KeyGenerator: Send + Sync {
    async fn generate(&self, curve: KeyCurve, strength: u32) -> LedgerResult<GeneratedKey>;
}

/// Generates keys in process with the secp256k1 local signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeyGenerator;

impl LocalKeyGenerator {
    /// Rebuild a key from a hex-encoded private key (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> LedgerResult<GeneratedKey> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;
        Ok(GeneratedKey::from_signer(signer))
    }
}

#[async_trait]
impl KeyGenerator for LocalKeyGenerator {
    async fn generate(&self, curve: KeyCurve, strength: u32) -> LedgerResult<GeneratedKey> {
        if curve != KeyCurve::Secp256k1 {
            return Err(LedgerError::Wallet(format!("unsupported curve {:?}", curve)));
        }
        if strength != 256 {
            return Err(LedgerError::Wallet(format!("unsupported key strength {}", strength)));
        }

        let key = GeneratedKey::from_signer(PrivateKeySigner::random());
        tracing::info!(public_key = %key.public_key, "Generated account key");
        Ok(key)
    }
}
