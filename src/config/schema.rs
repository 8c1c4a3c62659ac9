//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet core.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::Network;

/// Root configuration for the wallet core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Network the wallet starts on.
    pub network: Network,

    /// Ledger access node settings.
    pub ledger: LedgerConfig,

    /// Transaction monitoring loop settings.
    pub monitor: MonitorConfig,

    /// Transfer-list indexer settings.
    pub indexer: IndexerConfig,

    /// Block explorer base URLs.
    pub explorer: ExplorerConfig,

    /// Pending transaction persistence.
    pub pending_store: PendingStoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger REST access node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// REST endpoint for mainnet.
    pub mainnet_rest_url: String,

    /// REST endpoint for testnet.
    pub testnet_rest_url: String,

    /// REST endpoint for a local emulator.
    pub emulator_rest_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Interval between status checks while waiting for execution/sealing.
    pub watch_interval_ms: u64,

    /// Maximum status checks per watch before giving up.
    pub watch_max_attempts: u32,
}

impl LedgerConfig {
    /// REST base URL for a network.
    pub fn rest_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_rest_url,
            Network::Testnet => &self.testnet_rest_url,
            Network::Emulator => &self.emulator_rest_url,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mainnet_rest_url: "https://rest-mainnet.onflow.org".to_string(),
            testnet_rest_url: "https://rest-testnet.onflow.org".to_string(),
            emulator_rest_url: "http://localhost:8888".to_string(),
            request_timeout_secs: 10,
            watch_interval_ms: 1000,
            watch_max_attempts: 600,
        }
    }
}

/// Transaction monitoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay between transaction result fetches in `polling_transaction`.
    pub poll_interval_ms: u64,

    /// Maximum fetches in `polling_transaction`.
    pub poll_max_attempts: u32,

    /// Overall deadline for `polling_transaction` in seconds.
    pub poll_deadline_secs: u64,

    /// Delay between transfer-list reconciliation attempts.
    pub transfer_list_delay_ms: u64,

    /// Reconciliation attempts before giving up.
    pub transfer_list_max_attempts: u32,

    /// Page size used when loading the transfer list.
    pub transfer_list_page_size: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            poll_max_attempts: 200,
            poll_deadline_secs: 600,
            transfer_list_delay_ms: 5000,
            transfer_list_max_attempts: 5,
            transfer_list_page_size: 15,
        }
    }
}

/// Off-chain transfer indexer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Base URL of the indexer API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lilico.app".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Explorer URL templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub mainnet_url: String,
    pub testnet_url: String,
    pub emulator_url: String,
    /// Path appended to the base when the active account is an EVM account.
    pub evm_suffix: String,
    pub view_source_url: String,
    pub emulator_view_source_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            mainnet_url: "https://www.flowscan.io".to_string(),
            testnet_url: "https://testnet.flowscan.io".to_string(),
            emulator_url: "http://localhost:8888".to_string(),
            evm_suffix: "/evm".to_string(),
            view_source_url: "https://f.dnz.dev".to_string(),
            emulator_view_source_url: "http://localhost:8888".to_string(),
        }
    }
}

/// Pending transaction store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PendingStoreConfig {
    /// JSON snapshot file. In-memory only when unset.
    pub persistence_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
