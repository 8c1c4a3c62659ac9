//! Transaction lifecycle monitoring.
//!
//! # Data Flow
//! ```text
//! listen_transaction(tx_id)
//!     → store.rs      record Submitted        (under locks.rs key guard)
//!     → LedgerClient  once_executed
//!     → store.rs      record Executed, notify (explorer.rs deep link), invalidate balance
//!     → LedgerClient  once_sealed
//!     → store.rs      record Sealed, invalidate balance
//!     → indexer.rs    poll_transfer_list until the indexer lists the hash
//!
//! failures → errors.rs classify → MonitorEvent::TransactionError broadcast
//! ```

pub mod context;
pub mod errors;
pub mod explorer;
pub mod indexer;
pub mod locks;
pub mod monitor;
pub mod store;
pub mod types;

pub use context::{ContextState, LogNotifier, Notifier, StaticWalletContext, WalletContext};
pub use errors::{classify_error, MonitorError, TransactionFailure};
pub use indexer::{HttpTransferIndex, TransferIndex};
pub use monitor::TransactionMonitor;
pub use store::{MemoryPendingStore, PendingStore, StoreError};
pub use types::{
    BalanceKey, MonitorEvent, Notification, PendingTransaction, TransactionDisplay, TransferPage,
    TransferRecord, TxStatus,
};
