//! Flow wallet core: transaction lifecycle monitoring and key rotation.

pub mod blockchain;
pub mod config;
pub mod keys;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transactions;

pub use config::schema::WalletConfig;
pub use keys::{BloctoDetector, KeyRotationService};
pub use lifecycle::Shutdown;
pub use transactions::TransactionMonitor;
