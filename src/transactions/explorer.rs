//! Explorer URL lookups and deep links.

use serde_json::Value;

use crate::blockchain::types::{AccountType, EventRecord, Network, TransactionId};
use crate::config::ExplorerConfig;

/// Explorer base URL for the wallet's current selection.
///
/// Emulator mode always points at the local explorer, without the EVM suffix.
pub fn flowscan_url(
    config: &ExplorerConfig,
    network: Network,
    emulator_mode: bool,
    account_type: AccountType,
) -> String {
    if emulator_mode {
        return config.emulator_url.clone();
    }

    let base = match network {
        Network::Mainnet => &config.mainnet_url,
        Network::Testnet => &config.testnet_url,
        Network::Emulator => return config.emulator_url.clone(),
    };

    match account_type {
        AccountType::Evm => format!("{}{}", base.trim_end_matches('/'), config.evm_suffix),
        _ => base.clone(),
    }
}

/// Contract source viewer base URL.
pub fn view_source_url(config: &ExplorerConfig, network: Network, emulator_mode: bool) -> String {
    if emulator_mode || network == Network::Emulator {
        config.emulator_view_source_url.clone()
    } else {
        config.view_source_url.clone()
    }
}

/// Hex hash of the first EVM event carrying a byte-array `hash` field.
pub fn evm_transaction_hash(events: &[EventRecord]) -> Option<String> {
    events
        .iter()
        .filter(|e| e.event_type.contains("EVM"))
        .find_map(|e| e.data.get("hash").and_then(bytes_from_json))
        .map(|bytes| format!("0x{}", alloy::primitives::hex::encode(bytes)))
}

fn bytes_from_json(value: &Value) -> Option<Vec<u8>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
            Value::String(s) => s.parse::<u8>().ok(),
            _ => None,
        })
        .collect()
}

/// Deep link for an executed transaction.
///
/// EVM context: the EVM transaction page when the execution emitted an EVM
/// hash, otherwise the EVM account page. Native context: the transaction page.
pub fn transaction_link(
    explorer_base: &str,
    account_type: AccountType,
    tx_id: &TransactionId,
    events: &[EventRecord],
    evm_address: Option<&str>,
) -> String {
    let base = explorer_base.trim_end_matches('/');
    if account_type != AccountType::Evm {
        return format!("{}/tx/{}", base, tx_id);
    }

    match evm_transaction_hash(events) {
        Some(hash) => format!("{}/tx/{}", base, hash),
        None => match evm_address {
            Some(address) => format!("{}/address/{}", base, address),
            None => base.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TX: &str = "8a3c5bd0fa6a1cbe0ac18d5c5b1ae1fbcf4d8ba2cb26c1c0c3e2e7d5c68d0f11";

    #[test]
    fn test_flowscan_urls() {
        let config = ExplorerConfig::default();
        assert_eq!(
            flowscan_url(&config, Network::Mainnet, false, AccountType::Main),
            "https://www.flowscan.io"
        );
        assert_eq!(
            flowscan_url(&config, Network::Testnet, false, AccountType::Child),
            "https://testnet.flowscan.io"
        );
        assert_eq!(
            flowscan_url(&config, Network::Mainnet, false, AccountType::Evm),
            "https://www.flowscan.io/evm"
        );
        assert_eq!(
            flowscan_url(&config, Network::Mainnet, true, AccountType::Evm),
            "http://localhost:8888"
        );
    }

    #[test]
    fn test_view_source_urls() {
        let config = ExplorerConfig::default();
        assert_eq!(view_source_url(&config, Network::Testnet, false), "https://f.dnz.dev");
        assert!(view_source_url(&config, Network::Mainnet, true).starts_with("http://localhost"));
    }

    #[test]
    fn test_native_link() {
        let tx = TransactionId::parse(TX).unwrap();
        let link = transaction_link("https://www.flowscan.io", AccountType::Main, &tx, &[], None);
        assert_eq!(link, format!("https://www.flowscan.io/tx/{}", TX));
    }

    #[test]
    fn test_evm_link_uses_event_hash() {
        let tx = TransactionId::parse(TX).unwrap();
        let events = vec![
            EventRecord {
                event_type: "A.1654653399040a61.FlowToken.TokensWithdrawn".to_string(),
                data: json!({"amount": "1.0"}),
                ..Default::default()
            },
            EventRecord {
                event_type: "A.e467b9dd11fa00df.EVM.TransactionExecuted".to_string(),
                data: json!({"hash": [222, 173, "190", 239]}),
                ..Default::default()
            },
        ];
        let link = transaction_link("https://www.flowscan.io/evm", AccountType::Evm, &tx, &events, None);
        assert_eq!(link, "https://www.flowscan.io/evm/tx/0xdeadbeef");
    }

    #[test]
    fn test_evm_link_falls_back_to_account() {
        let tx = TransactionId::parse(TX).unwrap();
        let events = vec![EventRecord {
            event_type: "A.e467b9dd11fa00df.EVM.TransactionExecuted".to_string(),
            data: json!({"hash": "not-bytes"}),
            ..Default::default()
        }];
        let link = transaction_link(
            "https://www.flowscan.io/evm",
            AccountType::Evm,
            &tx,
            &events,
            Some("0x00000000000000000000000235a9c2e7e9c8b3e0"),
        );
        assert_eq!(
            link,
            "https://www.flowscan.io/evm/address/0x00000000000000000000000235a9c2e7e9c8b3e0"
        );
    }
}
