//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals, timeouts, chunk sizes > 0)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DashboardConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;

use crate::config::schema::DashboardConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `prices.api_url`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "chain.rpc_url", &config.chain.rpc_url);
    for (i, url) in config.chain.failover_urls.iter().enumerate() {
        check_url(&mut errors, &format!("chain.failover_urls[{}]", i), url);
    }
    check_positive(&mut errors, "chain.rpc_timeout_secs", config.chain.rpc_timeout_secs);

    let contract = config.token.contract_address.trim();
    if !contract.is_empty() && contract.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "token.contract_address",
            format!("'{}' is not a valid address", contract),
        ));
    }

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }

    check_positive(
        &mut errors,
        "transfer.confirmation_timeout_secs",
        config.transfer.confirmation_timeout_secs,
    );
    check_positive(
        &mut errors,
        "transfer.receipt_poll_interval_ms",
        config.transfer.receipt_poll_interval_ms,
    );
    check_positive(&mut errors, "history.block_chunk_size", config.history.block_chunk_size);

    check_url(&mut errors, "prices.api_url", &config.prices.api_url);
    if config.prices.asset_ids.is_empty() {
        errors.push(ValidationError::new("prices.asset_ids", "at least one asset id is required"));
    }
    if config.prices.vs_currency.trim().is_empty() {
        errors.push(ValidationError::new("prices.vs_currency", "must not be empty"));
    }
    check_positive(
        &mut errors,
        "prices.refresh_interval_secs",
        config.prices.refresh_interval_secs,
    );
    check_positive(&mut errors, "prices.request_timeout_secs", config.prices.request_timeout_secs);

    if config.storage.path.trim().is_empty() {
        errors.push(ValidationError::new("storage.path", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = value.parse::<url::Url>() {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than 0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DashboardConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DashboardConfig::default();
        config.chain.rpc_url = "not a url".into();
        config.token.contract_address = "0x1234".into();
        config.prices.refresh_interval_secs = 0;
        config.prices.asset_ids.clear();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "chain.rpc_url",
                "token.contract_address",
                "prices.asset_ids",
                "prices.refresh_interval_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = DashboardConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
