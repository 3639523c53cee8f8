//! Configuration schema definitions.
//!
//! Every section defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the dashboard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// JSON-RPC connection settings.
    pub chain: ChainConfig,

    /// Token contract binding.
    pub token: TokenConfig,

    /// Signing key source and approval behaviour.
    pub wallet: WalletConfig,

    /// Transfer confirmation settings.
    pub transfer: TransferConfig,

    /// Event history scanning.
    pub history: HistoryConfig,

    /// Public price API.
    pub prices: PriceConfig,

    /// Local persistence for poll and feedback.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID (1 mainnet, 11155111 sepolia, 31337 anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
        }
    }
}

/// Token contract binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Deployed ERC-20 contract address.
    pub contract_address: String,

    /// Display symbol.
    pub symbol: String,

    /// Skip the `decimals()` call and use this value instead.
    pub decimals_override: Option<u8>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            symbol: "ADT".to_string(),
            decimals_override: None,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// Approve account and signing requests without prompting.
    pub auto_approve: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR.to_string(),
            auto_approve: false,
        }
    }
}

/// Transfer confirmation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Maximum time to wait for inclusion before giving up.
    pub confirmation_timeout_secs: u64,

    /// Blocks on top of the inclusion block required to settle.
    pub confirmation_blocks: u32,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            confirmation_blocks: 1,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// Transfer event history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// First block to scan (usually the contract deployment block).
    pub from_block: u64,

    /// Maximum block span per log query.
    pub block_chunk_size: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            from_block: 0,
            block_chunk_size: 10_000,
        }
    }
}

/// Price API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Simple-price endpoint.
    pub api_url: String,

    /// Asset identifiers to quote.
    pub asset_ids: Vec<String>,

    /// Quote currency.
    pub vs_currency: String,

    /// Ticker refresh interval in seconds.
    pub refresh_interval_secs: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            asset_ids: vec![
                "aditi".to_string(),
                "ethereum".to_string(),
                "binancecoin".to_string(),
            ],
            vs_currency: "usd".to_string(),
            refresh_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

/// Local persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the key-value store.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "adt-community.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
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
