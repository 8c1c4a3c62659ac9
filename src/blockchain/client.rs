//! Ledger query client with timeout and error handling.
//!
//! # Responsibilities
//! - Look up account keys
//! - Fetch transaction results from the REST access node
//! - Wait for a transaction to be executed or sealed
//! - Decode JSON-Cadence event payloads into plain JSON

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::time::timeout;

use crate::blockchain::types::{
    LedgerError, LedgerResult, Network, RawAccountKey, TransactionId, TransactionResult,
};
use crate::config::LedgerConfig;
use crate::resilience::{poll_bounded, PollError, PollLimits};

/// Ledger access consumed by the monitor and the key services.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Full key list of an account.
    async fn account_keys(&self, network: Network, address: &str) -> LedgerResult<Vec<RawAccountKey>>;

    /// Current result document of a transaction.
    async fn transaction_result(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult>;

    /// Resolves once the transaction has executed, or fails with its error.
    async fn once_executed(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult>;

    /// Resolves once the transaction is sealed, or fails with its error.
    async fn once_sealed(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult>;
}

#[derive(Deserialize)]
struct AccountResponse {
    #[serde(default)]
    keys: Vec<RawAccountKey>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

/// REST implementation of [`LedgerClient`].
#[derive(Clone)]
pub struct RestLedgerClient {
    http: reqwest::Client,
    config: LedgerConfig,
    timeout_duration: Duration,
}

impl RestLedgerClient {
    /// Create a new client.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        for network in [Network::Mainnet, Network::Testnet, Network::Emulator] {
            let raw = config.rest_url(network);
            url::Url::parse(raw).map_err(|e| {
                LedgerError::Rpc(format!("Invalid REST URL '{}': {}", raw, e))
            })?;
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        Ok(Self {
            http,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn endpoint(&self, network: Network, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.rest_url(network).trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> LedgerResult<T> {
        let request = self.http.get(url).send();
        let response = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "REST request failed");
                return Err(LedgerError::Rpc(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(url = %url, "REST request timed out");
                return Err(LedgerError::Timeout(self.config.request_timeout_secs));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(LedgerError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))
    }

    /// Poll the result document until `reached`, or until it carries a failure.
    ///
    /// Transport errors, 404s and 5xx answers mean the node cannot serve the
    /// result yet; they use up an attempt and polling continues.
    async fn watch(
        &self,
        network: Network,
        tx_id: &TransactionId,
        stage: &'static str,
        reached: fn(&TransactionResult) -> bool,
    ) -> LedgerResult<TransactionResult> {
        let limits = PollLimits::attempts(self.config.watch_max_attempts);
        let delay = Duration::from_millis(self.config.watch_interval_ms);

        let result = poll_bounded(
            || async move {
                match self.transaction_result(network, tx_id).await {
                    Ok(result) => Ok(Some(result)),
                    Err(e) if is_transient(&e) => {
                        tracing::debug!(tx_id = %tx_id, stage, error = %e, "Transaction result not available yet");
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            },
            |r: &Option<TransactionResult>| match r {
                Some(r) => !reached(r) && r.failure().is_none(),
                None => true,
            },
            delay,
            limits,
            None,
        )
        .await
        .map_err(|e| match e {
            PollError::Producer(e) => e,
            PollError::Exhausted { attempts } | PollError::DeadlineExceeded { attempts } => {
                LedgerError::WatchExhausted {
                    tx_id: tx_id.to_string(),
                    stage,
                    attempts,
                }
            }
            PollError::Cancelled => LedgerError::Message("watch cancelled".to_string()),
        })?;

        let result = result.ok_or_else(|| LedgerError::WatchExhausted {
            tx_id: tx_id.to_string(),
            stage,
            attempts: self.config.watch_max_attempts,
        })?;

        match result.failure() {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }
}

/// Errors after which a watch keeps polling.
fn is_transient(err: &LedgerError) -> bool {
    match err {
        LedgerError::Rpc(_) | LedgerError::Timeout(_) => true,
        LedgerError::Http { status, .. } => *status == 404 || *status == 429 || *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl LedgerClient for RestLedgerClient {
    async fn account_keys(&self, network: Network, address: &str) -> LedgerResult<Vec<RawAccountKey>> {
        let url = self.endpoint(network, &format!("v1/accounts/{}?expand=keys", address));
        let account: AccountResponse = self.get_json(&url).await?;
        Ok(account.keys)
    }

    async fn transaction_result(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        let url = self.endpoint(network, &format!("v1/transaction_results/{}", tx_id));
        let mut result: TransactionResult = self.get_json(&url).await?;
        decode_event_payloads(&mut result);
        tracing::debug!(tx_id = %tx_id, status = %result.status, "Fetched transaction result");
        Ok(result)
    }

    async fn once_executed(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        self.watch(network, tx_id, "executed", TransactionResult::is_executed)
            .await
    }

    async fn once_sealed(
        &self,
        network: Network,
        tx_id: &TransactionId,
    ) -> LedgerResult<TransactionResult> {
        self.watch(network, tx_id, "sealed", TransactionResult::is_sealed)
            .await
    }
}

impl std::fmt::Debug for RestLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestLedgerClient")
            .field("mainnet", &self.config.mainnet_rest_url)
            .field("testnet", &self.config.testnet_rest_url)
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

/// Fill `data` for every event whose payload decodes as JSON-Cadence.
pub fn decode_event_payloads(result: &mut TransactionResult) {
    for event in &mut result.events {
        if event.payload.is_empty() || !event.data.is_null() {
            continue;
        }
        let decoded = BASE64
            .decode(event.payload.as_bytes())
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());
        match decoded {
            Some(cadence) => event.data = cadence_to_json(&cadence),
            None => tracing::debug!(event_type = %event.event_type, "Undecodable event payload"),
        }
    }
}

/// Convert a JSON-Cadence value into plain JSON.
///
/// Composites become objects keyed by field name, arrays stay arrays and
/// primitives keep their encoded (usually string) value.
pub fn cadence_to_json(value: &Value) -> Value {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    let inner = value.get("value").unwrap_or(&Value::Null);

    match kind {
        "Event" | "Struct" | "Resource" | "Contract" | "Enum" => {
            let mut object = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_array) {
                for field in fields {
                    if let Some(name) = field.get("name").and_then(Value::as_str) {
                        let v = field.get("value").map(cadence_to_json).unwrap_or(Value::Null);
                        object.insert(name.to_string(), v);
                    }
                }
            }
            Value::Object(object)
        }
        "Array" => Value::Array(
            inner
                .as_array()
                .map(|items| items.iter().map(cadence_to_json).collect())
                .unwrap_or_default(),
        ),
        "Optional" => {
            if inner.is_null() {
                Value::Null
            } else {
                cadence_to_json(inner)
            }
        }
        "Dictionary" => {
            let mut object = Map::new();
            for entry in inner.as_array().into_iter().flatten() {
                let key = entry.get("key").map(cadence_to_json).unwrap_or(Value::Null);
                let key = match key {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let v = entry.get("value").map(cadence_to_json).unwrap_or(Value::Null);
                object.insert(key, v);
            }
            Value::Object(object)
        }
        _ => inner.clone(),
    }
}
