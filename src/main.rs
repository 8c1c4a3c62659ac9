//! Flow wallet core CLI.
//!
//! Runs the transaction monitor and key services against a live access node.
//!
//! ```text
//! flow-wallet status <tx_id>            one-shot transaction result
//! flow-wallet watch <tx_id>             poll until sealed (Ctrl-C cancels)
//! flow-wallet listen <tx_id> -a <addr>  full lifecycle with pending store + events
//! flow-wallet detect <address>          Blocto key pattern detection
//! flow-wallet rotation-plan <address>   new key + add-and-revoke payload, not submitted
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use flow_wallet_core::blockchain::{
    AddAndRevokeKeys, KeyCurve, KeyGenerator, LedgerClient, LocalKeyGenerator, Network,
    RestLedgerClient, TransactionId,
};
use flow_wallet_core::config::{load_config, WalletConfig};
use flow_wallet_core::keys::BloctoDetector;
use flow_wallet_core::lifecycle::signals::spawn_ctrl_c_handler;
use flow_wallet_core::observability::{logging, metrics};
use flow_wallet_core::transactions::{
    ContextState, HttpTransferIndex, LogNotifier, MemoryPendingStore, MonitorEvent,
    StaticWalletContext, TransactionDisplay, TransactionMonitor,
};
use flow_wallet_core::Shutdown;

#[derive(Parser)]
#[command(name = "flow-wallet")]
#[command(about = "Transaction monitoring and key rotation tools for Flow wallets", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network override (mainnet, testnet, emulator).
    #[arg(short, long)]
    network: Option<Network>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the current result of a transaction
    Status { tx_id: String },
    /// Poll a transaction until it is sealed
    Watch { tx_id: String },
    /// Track a transaction through execution, sealing and indexing
    Listen {
        tx_id: String,
        #[arg(short, long)]
        address: String,
        #[arg(long, default_value = "Transaction")]
        title: String,
    },
    /// Check an account for the Blocto key pattern
    Detect { address: String },
    /// Generate a replacement key and print the rotation transaction
    RotationPlan { address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WalletConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }

    logging::init(&config.observability);
    tracing::info!(network = %config.network, "flow-wallet v0.1.0 starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let ledger = Arc::new(RestLedgerClient::new(config.ledger.clone())?);

    match cli.command {
        Commands::Status { tx_id } => {
            let Some(tx_id) = TransactionId::parse(&tx_id) else {
                return Err(format!("malformed transaction id '{}'", tx_id).into());
            };
            let result = ledger.transaction_result(config.network, &tx_id).await?;
            print_json(&result)?;
        }
        Commands::Watch { tx_id } => {
            let monitor = build_monitor(&config, ledger.clone(), None)?;
            let shutdown = Arc::new(Shutdown::new());
            let mut cancel = shutdown.subscribe();
            spawn_ctrl_c_handler(shutdown);

            match monitor
                .polling_transaction(&tx_id, config.network, Some(&mut cancel))
                .await?
            {
                Some(result) => print_json(&result)?,
                None => eprintln!("Ignoring malformed transaction id"),
            }
        }
        Commands::Listen {
            tx_id,
            address,
            title,
        } => {
            let monitor = build_monitor(&config, ledger.clone(), Some(address))?;
            let mut events = monitor.subscribe();
            let printer = tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    print_event(&event);
                }
            });

            monitor
                .listen_transaction(
                    &tx_id,
                    true,
                    TransactionDisplay {
                        title,
                        ..Default::default()
                    },
                )
                .await;
            drop(monitor);
            let _ = printer.await;
        }
        Commands::Detect { address } => {
            let detector = BloctoDetector::new(ledger, config.network);
            let result = detector.detect_blocto_key(&address).await;
            print_json(&result)?;
        }
        Commands::RotationPlan { address } => {
            let detector = BloctoDetector::new(ledger, config.network);
            let detection = detector.detect_blocto_key(&address).await;
            if !detection.is_blocto_key {
                print_json(&json!({ "rotation_needed": false, "detection": detection }))?;
                return Ok(());
            }

            let key = LocalKeyGenerator.generate(KeyCurve::Secp256k1, 256).await?;
            let payload =
                AddAndRevokeKeys::new(vec![key.public_key.clone()], detection.blocto_key_indexes.clone());
            print_json(&json!({
                "rotation_needed": true,
                "detection": detection,
                "new_public_key": key.public_key,
                "script": payload.script(),
                "arguments": payload.arguments(),
            }))?;
        }
    }

    Ok(())
}

fn build_monitor(
    config: &WalletConfig,
    ledger: Arc<RestLedgerClient>,
    address: Option<String>,
) -> Result<TransactionMonitor, Box<dyn std::error::Error>> {
    let store = match &config.pending_store.persistence_path {
        Some(path) => MemoryPendingStore::load_from_file(path)?,
        None => MemoryPendingStore::new(None),
    };
    let context = StaticWalletContext::new(ContextState {
        address,
        network: config.network,
        currency: "USD".to_string(),
        ..Default::default()
    });

    Ok(TransactionMonitor::new(
        ledger,
        Arc::new(store),
        Arc::new(HttpTransferIndex::new(&config.indexer)?),
        Arc::new(context),
        Arc::new(LogNotifier),
        config,
    ))
}

fn print_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::StatusChanged { tx_id, status } => println!("{} → {:?}", tx_id, status),
        MonitorEvent::BalanceInvalidated(key) => {
            println!("balance stale: {} {} {}", key.network, key.address, key.currency)
        }
        MonitorEvent::TransactionError {
            error_message,
            error_code,
        } => match error_code {
            Some(code) => eprintln!("transaction error [{}]: {}", code, error_message),
            None => eprintln!("transaction error: {}", error_message),
        },
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
