//! Transaction monitoring service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{Network, TransactionId, TransactionResult};
use crate::config::{ExplorerConfig, MonitorConfig, WalletConfig};
use crate::observability::metrics;
use crate::resilience::{poll_bounded, PollLimits};
use crate::transactions::context::{Notifier, WalletContext};
use crate::transactions::errors::{classify, MonitorError};
use crate::transactions::explorer;
use crate::transactions::indexer::TransferIndex;
use crate::transactions::locks::KeyedLocks;
use crate::transactions::store::PendingStore;
use crate::transactions::types::{
    normalize_hash, BalanceKey, MonitorEvent, Notification, PendingTransaction,
    TransactionDisplay, TransferPage, TxStatus,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tracks submitted transactions to finality.
///
/// All state lives in the injected [`PendingStore`]; the monitor itself keeps
/// nothing between calls besides the per-key locks.
pub struct TransactionMonitor {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn PendingStore>,
    transfers: Arc<dyn TransferIndex>,
    context: Arc<dyn WalletContext>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<MonitorEvent>,
    locks: KeyedLocks,
    config: MonitorConfig,
    explorer: ExplorerConfig,
}

impl TransactionMonitor {
    /// Create a new monitor.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn PendingStore>,
        transfers: Arc<dyn TransferIndex>,
        context: Arc<dyn WalletContext>,
        notifier: Arc<dyn Notifier>,
        config: &WalletConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            ledger,
            store,
            transfers,
            context,
            notifier,
            events,
            locks: KeyedLocks::new(),
            config: config.monitor.clone(),
            explorer: config.explorer.clone(),
        }
    }

    /// Subscribe to status, cache invalidation and error events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Poll the REST result until the transaction is sealed.
    ///
    /// Invalid ids return `Ok(None)` without touching the network. The loop
    /// is bounded by the configured attempt cap and deadline and stops early
    /// when `cancel` fires.
    pub async fn polling_transaction(
        &self,
        tx_id: &str,
        network: Network,
        cancel: Option<&mut broadcast::Receiver<()>>,
    ) -> Result<Option<TransactionResult>, MonitorError> {
        let Some(tx_id) = TransactionId::parse(tx_id) else {
            tracing::debug!(tx_id = %tx_id, "Ignoring malformed transaction id");
            return Ok(None);
        };

        let limits = PollLimits::attempts(self.config.poll_max_attempts)
            .with_deadline(Duration::from_secs(self.config.poll_deadline_secs));

        let result = poll_bounded(
            || self.ledger.transaction_result(network, &tx_id),
            |r: &TransactionResult| !r.is_sealed(),
            Duration::from_millis(self.config.poll_interval_ms),
            limits,
            cancel,
        )
        .await?;

        tracing::info!(tx_id = %tx_id, network = %network, "Transaction sealed");
        Ok(Some(result))
    }

    /// Watch a transaction through execution and sealing.
    ///
    /// Never fails: errors are logged, counted and broadcast as
    /// [`MonitorEvent::TransactionError`]. Once a hash is known, the
    /// transfer list is reconciled even if sealing failed.
    pub async fn listen_transaction(
        &self,
        tx_id: &str,
        send_notification: bool,
        display: TransactionDisplay,
    ) {
        let Some(tx_id) = TransactionId::parse(tx_id) else {
            tracing::debug!(tx_id = %tx_id, "Ignoring malformed transaction id");
            return;
        };
        let Some(address) = self.context.current_address().await else {
            tracing::warn!(tx_id = %tx_id, "No active address, not tracking transaction");
            return;
        };
        let network = self.context.network().await;
        let currency = self.context.currency().await;
        let balance_key = BalanceKey {
            network,
            address: address.clone(),
            currency,
        };

        let mut tx_hash = None;
        if let Err(err) = self
            .track(&tx_id, &balance_key, send_notification, &display, &mut tx_hash)
            .await
        {
            self.report_failure(&tx_id, &err);
        }

        if let Some(hash) = tx_hash {
            self.reconcile(&balance_key, &hash, self.config.transfer_list_max_attempts)
                .await;
        }
    }

    async fn track(
        &self,
        tx_id: &TransactionId,
        key: &BalanceKey,
        send_notification: bool,
        display: &TransactionDisplay,
        tx_hash: &mut Option<String>,
    ) -> Result<(), MonitorError> {
        let network = key.network;
        let address = key.address.as_str();

        {
            let _guard = self.locks.lock(network, address).await;
            self.store
                .put(PendingTransaction::submitted(network, address, tx_id.clone(), display))
                .await?;
        }
        self.publish(MonitorEvent::StatusChanged {
            tx_id: tx_id.clone(),
            status: TxStatus::Submitted,
        });
        tracing::info!(tx_id = %tx_id, network = %network, address = %address, "Watching transaction");

        let executed = self.ledger.once_executed(network, tx_id).await?;
        let hash = tx_id.to_string();
        *tx_hash = Some(hash.clone());

        self.advance(network, address, tx_id, TxStatus::Executed, Some(hash.clone()))
            .await?;
        metrics::record_transaction("success");
        tracing::info!(tx_id = %tx_id, status = %executed.status, "Transaction executed");

        if send_notification {
            if let Err(e) = self.notify_executed(network, tx_id, &executed, display).await {
                tracing::debug!(tx_id = %tx_id, error = %e, "Notification failed");
            }
        }

        self.invalidate_balance(key);

        self.ledger.once_sealed(network, tx_id).await?;
        self.advance(network, address, tx_id, TxStatus::Sealed, Some(hash))
            .await?;
        self.invalidate_balance(key);
        tracing::info!(tx_id = %tx_id, "Transaction sealed");

        Ok(())
    }

    /// Update the stored record for `tx_id`, unless it was cleared or superseded.
    async fn advance(
        &self,
        network: Network,
        address: &str,
        tx_id: &TransactionId,
        status: TxStatus,
        hash: Option<String>,
    ) -> Result<(), MonitorError> {
        let _guard = self.locks.lock(network, address).await;

        match self.store.get(network, address).await? {
            Some(mut record) if &record.tx_id == tx_id => {
                record.advance(status, hash);
                self.store.put(record).await?;
                self.publish(MonitorEvent::StatusChanged {
                    tx_id: tx_id.clone(),
                    status,
                });
            }
            _ => {
                tracing::debug!(tx_id = %tx_id, ?status, "Pending record cleared or superseded");
            }
        }
        Ok(())
    }

    async fn notify_executed(
        &self,
        network: Network,
        tx_id: &TransactionId,
        executed: &TransactionResult,
        display: &TransactionDisplay,
    ) -> Result<(), MonitorError> {
        let emulator = self.context.emulator_mode().await;
        let account_type = self.context.account_type().await;
        let evm_address = self.context.evm_address().await;

        let base = explorer::flowscan_url(&self.explorer, network, emulator, account_type);
        let url = explorer::transaction_link(
            &base,
            account_type,
            tx_id,
            &executed.events,
            evm_address.as_deref(),
        );

        self.notifier
            .notify(Notification {
                url,
                title: display.title.clone(),
                body: display.body.clone(),
                icon: display.icon.clone(),
            })
            .await
    }

    fn report_failure(&self, tx_id: &TransactionId, err: &MonitorError) {
        let failure = classify(err);
        tracing::warn!(
            tx_id = %tx_id,
            error = %failure.message,
            error_code = ?failure.code,
            "Transaction watch failed"
        );
        metrics::record_transaction("failure");
        self.publish(MonitorEvent::TransactionError {
            error_message: failure.message,
            error_code: failure.code,
        });
    }

    fn invalidate_balance(&self, key: &BalanceKey) {
        tracing::debug!(network = %key.network, address = %key.address, currency = %key.currency, "Invalidating balance");
        self.publish(MonitorEvent::BalanceInvalidated(key.clone()));
    }

    fn publish(&self, event: MonitorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Wait for the indexer to list `tx_hash` as indexed for `address`.
    ///
    /// Performs at most `max_attempts` fetches spaced by the configured
    /// delay, against the active network. Fetch errors count as attempts.
    /// Returns whether the balance was refreshed.
    pub async fn poll_transfer_list(&self, address: &str, tx_hash: &str, max_attempts: u32) -> bool {
        let key = BalanceKey {
            network: self.context.network().await,
            address: address.to_string(),
            currency: self.context.currency().await,
        };
        self.reconcile(&key, tx_hash, max_attempts).await
    }

    /// Reconciliation loop for a fixed (network, address, currency).
    async fn reconcile(&self, key: &BalanceKey, tx_hash: &str, max_attempts: u32) -> bool {
        let target = normalize_hash(tx_hash);
        let delay = Duration::from_millis(self.config.transfer_list_delay_ms);

        for attempt in 1..=max_attempts {
            match self
                .transfers
                .transfers(key.network, &key.address, self.config.transfer_list_page_size, 0)
                .await
            {
                Ok(page) => {
                    let found = page.transactions.iter().any(|t| {
                        let hash = normalize_hash(&t.hash);
                        t.indexed && !hash.is_empty() && target.contains(&hash)
                    });
                    if found {
                        self.invalidate_balance(key);
                        metrics::record_reconcile("indexed");
                        tracing::info!(tx_hash = %tx_hash, attempt, "Transfer indexed");
                        return true;
                    }
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, attempt, error = %e, "Transfer list fetch failed");
                }
            }

            if attempt < max_attempts {
                sleep(delay).await;
            }
        }

        metrics::record_reconcile("exhausted");
        tracing::warn!(tx_hash = %tx_hash, max_attempts, "Transfer not indexed, giving up");
        false
    }

    /// Drop the pending record for the active (network, address).
    pub async fn clear_pending(&self) -> Result<(), MonitorError> {
        let Some(address) = self.context.current_address().await else {
            return Ok(());
        };
        let network = self.context.network().await;

        let _guard = self.locks.lock(network, &address).await;
        if let Some(record) = self.store.remove(network, &address).await? {
            tracing::info!(tx_id = %record.tx_id, "Cleared pending transaction");
        }
        Ok(())
    }

    /// Pending records for the active (network, address).
    pub async fn get_pending_tx(&self) -> Result<Vec<PendingTransaction>, MonitorError> {
        let Some(address) = self.context.current_address().await else {
            return Ok(Vec::new());
        };
        let network = self.context.network().await;
        Ok(self.store.get(network, &address).await?.into_iter().collect())
    }

    /// Stored record for `tx_id` if it is the one being tracked for the active pair.
    pub async fn get_transaction_status(
        &self,
        tx_id: &str,
    ) -> Result<Option<PendingTransaction>, MonitorError> {
        let Some(tx_id) = TransactionId::parse(tx_id) else {
            return Ok(None);
        };
        Ok(self
            .get_pending_tx()
            .await?
            .into_iter()
            .find(|r| r.tx_id == tx_id))
    }

    /// Transfer history, for `address` or the active account.
    pub async fn get_transactions(
        &self,
        address: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<TransferPage, MonitorError> {
        let address = match address.filter(|a| !a.is_empty()) {
            Some(a) => a.to_string(),
            None => match self.context.current_address().await {
                Some(a) => a,
                None => return Ok(TransferPage::default()),
            },
        };
        let network = self.context.network().await;
        self.transfers.transfers(network, &address, limit, offset).await
    }

    /// Explorer base URL for the current selection.
    pub async fn get_flowscan_url(&self) -> String {
        explorer::flowscan_url(
            &self.explorer,
            self.context.network().await,
            self.context.emulator_mode().await,
            self.context.account_type().await,
        )
    }

    /// Contract source viewer URL for the current selection.
    pub async fn get_view_source_url(&self) -> String {
        explorer::view_source_url(
            &self.explorer,
            self.context.network().await,
            self.context.emulator_mode().await,
        )
    }
}
