//! Wallet-side collaborators: active account/network and notification sink.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::blockchain::types::{AccountType, Network};
use crate::transactions::errors::MonitorError;
use crate::transactions::types::Notification;

/// Resolves what the wallet is currently pointed at.
#[async_trait]
pub trait WalletContext: Send + Sync {
    /// Address of the active account, if any.
    async fn current_address(&self) -> Option<String>;

    async fn network(&self) -> Network;

    /// Display currency for balances.
    async fn currency(&self) -> String;

    async fn account_type(&self) -> AccountType;

    /// Whether the wallet targets a local emulator.
    async fn emulator_mode(&self) -> bool;

    /// Address of the EVM account linked to the active account.
    async fn evm_address(&self) -> Option<String>;
}

/// Receives deep-link notifications for executed transactions.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), MonitorError>;
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), MonitorError> {
        tracing::info!(
            url = %notification.url,
            title = %notification.title,
            "Transaction notification"
        );
        Ok(())
    }
}

/// Snapshot of the wallet's active selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextState {
    pub address: Option<String>,
    pub network: Network,
    pub currency: String,
    pub account_type: AccountType,
    pub emulator_mode: bool,
    pub evm_address: Option<String>,
}

/// [`WalletContext`] backed by a mutable in-process snapshot.
#[derive(Debug, Default)]
pub struct StaticWalletContext {
    state: RwLock<ContextState>,
}

impl StaticWalletContext {
    pub fn new(state: ContextState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Replace the snapshot.
    pub fn set(&self, state: ContextState) {
        *self.state.write().expect("wallet context lock poisoned") = state;
    }

    pub fn snapshot(&self) -> ContextState {
        self.state.read().expect("wallet context lock poisoned").clone()
    }
}

#[async_trait]
impl WalletContext for StaticWalletContext {
    async fn current_address(&self) -> Option<String> {
        self.snapshot().address.filter(|a| !a.is_empty())
    }

    async fn network(&self) -> Network {
        self.snapshot().network
    }

    async fn currency(&self) -> String {
        self.snapshot().currency
    }

    async fn account_type(&self) -> AccountType {
        self.snapshot().account_type
    }

    async fn emulator_mode(&self) -> bool {
        self.snapshot().emulator_mode
    }

    async fn evm_address(&self) -> Option<String> {
        self.snapshot().evm_address
    }
}
