//! Off-chain transfer list access.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::types::Network;
use crate::config::IndexerConfig;
use crate::transactions::errors::MonitorError;
use crate::transactions::types::TransferPage;

/// Paged, most-recent-first transfer history of an address.
#[async_trait]
pub trait TransferIndex: Send + Sync {
    async fn transfers(
        &self,
        network: Network,
        address: &str,
        limit: u32,
        offset: u32,
    ) -> Result<TransferPage, MonitorError>;
}

/// HTTP client for the wallet's transfer indexer.
#[derive(Clone, Debug)]
pub struct HttpTransferIndex {
    http: reqwest::Client,
    base_url: url::Url,
    timeout_duration: Duration,
}

impl HttpTransferIndex {
    pub fn new(config: &IndexerConfig) -> Result<Self, MonitorError> {
        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            MonitorError::Indexer(format!("Invalid indexer URL '{}': {}", config.base_url, e))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn transfers_url(&self, address: &str, limit: u32, offset: u32) -> Result<url::Url, MonitorError> {
        let mut url = self
            .base_url
            .join("v1/account/transfers")
            .map_err(|e| MonitorError::Indexer(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }
}

#[async_trait]
impl TransferIndex for HttpTransferIndex {
    async fn transfers(
        &self,
        network: Network,
        address: &str,
        limit: u32,
        offset: u32,
    ) -> Result<TransferPage, MonitorError> {
        let url = self.transfers_url(address, limit, offset)?;
        let request = self
            .http
            .get(url)
            .header("network", network.as_str())
            .send();

        let response = timeout(self.timeout_duration, request)
            .await
            .map_err(|_| MonitorError::Indexer("transfer list request timed out".to_string()))?
            .map_err(|e| MonitorError::Indexer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MonitorError::Indexer(format!(
                "transfer list returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<TransferPage>()
            .await
            .map_err(|e| MonitorError::Indexer(e.to_string()))
    }
}
