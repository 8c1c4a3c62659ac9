//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! LedgerConfig (REST hosts, timeouts)
//!     → client.rs (account keys, transaction results, execution/seal watches)
//!     → keygen.rs (new secp256k1 account keys)
//!     → transaction.rs (add-and-revoke-keys payload, submission seam)
//! ```
//!
//! # Security Constraints
//! - Never log private keys
//! - All REST calls have configurable timeouts
//! - Watches are bounded by an attempt cap

pub mod client;
pub mod keygen;
pub mod transaction;
pub mod types;

pub use client::{LedgerClient, RestLedgerClient};
pub use keygen::{GeneratedKey, KeyCurve, KeyGenerator, LocalKeyGenerator};
pub use transaction::{AddAndRevokeKeys, KeySubmitter};
pub use types::{
    AccountType, EventRecord, FlowAccountKey, LedgerError, LedgerResult, Network, RawAccountKey,
    TransactionId, TransactionResult,
};
