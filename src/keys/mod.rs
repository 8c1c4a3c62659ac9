//! Account key-rotation subsystem.
//!
//! # Data Flow
//! ```text
//! address
//!     → detector.rs (LedgerClient::account_keys → Blocto pattern evaluation)
//!     → rotation.rs (KeyGenerator → algorithm check → KeySubmitter::add_and_revoke_keys)
//! ```
//!
//! # Design Decisions
//! - Detection never fails; a failed lookup evaluates as "no keys"
//! - Rotation errors are typed and always propagated
//! - Add and revoke happen in a single ledger transaction

pub mod detector;
pub mod rotation;

pub use detector::{evaluate_keys, list_revoke_indexes, BloctoDetectionResult, BloctoDetector};
pub use rotation::{KeyRotationResult, KeyRotationService, RotationError, RotationErrorKind};
