//! Key rotation away from the Blocto pattern.
//!
//! # Phases
//! ```text
//! Idle → Detecting → NotNeeded
//!                  → Generating → Validating → Submitting → Done
//!                                                         → Failed
//! ```
//!
//! No retries at this layer; every failure is terminal for the call.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::blockchain::keygen::{KeyCurve, KeyGenerator};
use crate::blockchain::transaction::KeySubmitter;
use crate::blockchain::types::TransactionId;
use crate::keys::detector::{BloctoDetectionResult, BloctoDetector};
use crate::observability::metrics;

const KEY_STRENGTH: u32 = 256;
const REQUIRED_SIGN_ALGO: &str = "ecdsa_secp256k1";
const REQUIRED_HASH_ALGO: &str = "sha2_256";

/// Kind of rotation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationErrorKind {
    ValidationFailed,
    NotNeedRotate,
    KeyDerivationFailed,
    CadenceTransactionFailed,
}

impl RotationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationErrorKind::ValidationFailed => "VALIDATION_FAILED",
            RotationErrorKind::NotNeedRotate => "NOT_NEED_ROTATE",
            RotationErrorKind::KeyDerivationFailed => "KEY_DERIVATION_FAILED",
            RotationErrorKind::CadenceTransactionFailed => "CADENCE_TRANSACTION_FAILED",
        }
    }
}

impl fmt::Display for RotationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed rotation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RotationError {
    pub kind: RotationErrorKind,
    pub message: String,
}

impl RotationError {
    pub fn new(kind: RotationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Successful rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRotationResult {
    pub detection: BloctoDetectionResult,
    pub tx_id: TransactionId,
}

#[derive(Debug, Clone, Copy)]
enum RotationPhase {
    Detecting,
    Generating,
    Validating,
    Submitting,
}

/// Replaces Blocto keys with a single new key in one transaction.
pub struct KeyRotationService {
    detector: BloctoDetector,
    keygen: Arc<dyn KeyGenerator>,
    submitter: Arc<dyn KeySubmitter>,
}

impl KeyRotationService {
    pub fn new(
        detector: BloctoDetector,
        keygen: Arc<dyn KeyGenerator>,
        submitter: Arc<dyn KeySubmitter>,
    ) -> Self {
        Self {
            detector,
            keygen,
            submitter,
        }
    }

    /// Rotate the keys of `address`.
    pub async fn rotate_keys(&self, address: &str) -> Result<KeyRotationResult, RotationError> {
        let result = self.run(address).await;
        match &result {
            Ok(done) => {
                metrics::record_rotation("done");
                tracing::info!(address = %address, tx_id = %done.tx_id, "Key rotation submitted");
            }
            Err(e) => {
                metrics::record_rotation(if e.kind == RotationErrorKind::NotNeedRotate {
                    "not_needed"
                } else {
                    "failed"
                });
                tracing::warn!(address = %address, kind = %e.kind, error = %e.message, "Key rotation stopped");
            }
        }
        result
    }

    async fn run(&self, address: &str) -> Result<KeyRotationResult, RotationError> {
        if address.is_empty() {
            return Err(RotationError::new(
                RotationErrorKind::ValidationFailed,
                "address is required",
            ));
        }

        enter(address, RotationPhase::Detecting);
        let detection = self.detector.detect_blocto_key(address).await;
        if !detection.is_blocto_key {
            return Err(RotationError::new(
                RotationErrorKind::NotNeedRotate,
                "account does not use the Blocto key pattern",
            ));
        }

        enter(address, RotationPhase::Generating);
        let new_key = self
            .keygen
            .generate(KeyCurve::Secp256k1, KEY_STRENGTH)
            .await
            .map_err(|e| {
                RotationError::new(RotationErrorKind::CadenceTransactionFailed, e.to_string())
            })?;

        enter(address, RotationPhase::Validating);
        let sign_algo = new_key.sign_algo.to_ascii_lowercase();
        let hash_algo = new_key.hash_algo.to_ascii_lowercase();
        if sign_algo != REQUIRED_SIGN_ALGO || hash_algo != REQUIRED_HASH_ALGO {
            return Err(RotationError::new(
                RotationErrorKind::KeyDerivationFailed,
                format!(
                    "generated key uses {}/{}, expected ECDSA_secp256k1/SHA2_256",
                    new_key.sign_algo, new_key.hash_algo
                ),
            ));
        }

        if detection.blocto_key_indexes.is_empty() {
            return Err(RotationError::new(
                RotationErrorKind::ValidationFailed,
                "no revocable Blocto keys",
            ));
        }

        let public_key = new_key
            .public_key
            .strip_prefix("0x")
            .unwrap_or(&new_key.public_key)
            .to_string();

        enter(address, RotationPhase::Submitting);
        let tx_id = self
            .submitter
            .add_and_revoke_keys(&[public_key], &detection.blocto_key_indexes)
            .await
            .map_err(|e| {
                RotationError::new(RotationErrorKind::CadenceTransactionFailed, e.to_string())
            })?;

        Ok(KeyRotationResult { detection, tx_id })
    }
}

fn enter(address: &str, phase: RotationPhase) {
    tracing::debug!(address = %address, ?phase, "Key rotation phase");
}
