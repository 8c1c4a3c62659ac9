//! Monitor errors and failure classification.

use thiserror::Error;

use crate::blockchain::types::{extract_error_code, LedgerError};
use crate::resilience::PollError;
use crate::transactions::store::StoreError;

/// Errors surfaced by the transaction monitor and its collaborators.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("pending store error: {0}")]
    Store(#[from] StoreError),

    #[error("indexer error: {0}")]
    Indexer(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("transaction not sealed after {attempts} attempts")]
    PollExhausted { attempts: u32 },

    #[error("transaction not sealed before deadline ({attempts} attempts)")]
    PollDeadline { attempts: u32 },

    #[error("polling cancelled")]
    Cancelled,
}

impl From<PollError<LedgerError>> for MonitorError {
    fn from(err: PollError<LedgerError>) -> Self {
        match err {
            PollError::Producer(e) => MonitorError::Ledger(e),
            PollError::Exhausted { attempts } => MonitorError::PollExhausted { attempts },
            PollError::DeadlineExceeded { attempts } => MonitorError::PollDeadline { attempts },
            PollError::Cancelled => MonitorError::Cancelled,
        }
    }
}

/// Message and optional code reported for a failed watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFailure {
    pub message: String,
    pub code: Option<u64>,
}

/// Classify a ledger error.
///
/// Structured transaction errors carry their code. Plain message errors carry
/// none. Everything else is a generic error whose code is recovered from an
/// embedded `[Error Code: N]` marker when present; that recovery is a
/// non-authoritative fallback.
pub fn classify_error(err: &LedgerError) -> TransactionFailure {
    match err {
        LedgerError::Transaction { code, message } => TransactionFailure {
            message: message.clone(),
            code: Some(*code),
        },
        LedgerError::Message(message) => TransactionFailure {
            message: message.clone(),
            code: None,
        },
        other => {
            let message = other.to_string();
            let code = extract_error_code(&message);
            TransactionFailure { message, code }
        }
    }
}

/// Classify any monitor error.
pub fn classify(err: &MonitorError) -> TransactionFailure {
    match err {
        MonitorError::Ledger(e) => classify_error(e),
        other => {
            let message = other.to_string();
            let code = extract_error_code(&message);
            TransactionFailure { message, code }
        }
    }
}
