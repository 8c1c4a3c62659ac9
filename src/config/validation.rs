//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, attempt caps > 0)
//! - Check that every configured URL parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::WalletConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let non_zero: [(&'static str, u64); 8] = [
        ("ledger.request_timeout_secs", config.ledger.request_timeout_secs),
        ("ledger.watch_interval_ms", config.ledger.watch_interval_ms),
        ("ledger.watch_max_attempts", config.ledger.watch_max_attempts as u64),
        ("monitor.poll_interval_ms", config.monitor.poll_interval_ms),
        ("monitor.poll_max_attempts", config.monitor.poll_max_attempts as u64),
        ("monitor.poll_deadline_secs", config.monitor.poll_deadline_secs),
        ("monitor.transfer_list_max_attempts", config.monitor.transfer_list_max_attempts as u64),
        ("monitor.transfer_list_page_size", config.monitor.transfer_list_page_size as u64),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let urls: [(&'static str, &str); 7] = [
        ("ledger.mainnet_rest_url", config.ledger.mainnet_rest_url.as_str()),
        ("ledger.testnet_rest_url", config.ledger.testnet_rest_url.as_str()),
        ("ledger.emulator_rest_url", config.ledger.emulator_rest_url.as_str()),
        ("indexer.base_url", config.indexer.base_url.as_str()),
        ("explorer.mainnet_url", config.explorer.mainnet_url.as_str()),
        ("explorer.testnet_url", config.explorer.testnet_url.as_str()),
        ("explorer.emulator_url", config.explorer.emulator_url.as_str()),
    ];
    for (field, value) in urls {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.to_string(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WalletConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WalletConfig::default();
        config.monitor.poll_interval_ms = 0;
        config.monitor.transfer_list_max_attempts = 0;
        config.indexer.base_url = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero {
            field: "monitor.poll_interval_ms"
        }));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = WalletConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
