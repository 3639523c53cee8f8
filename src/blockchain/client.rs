//! Chain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint and its failovers
//! - Query chain state (chain id, block number, balances, receipts, logs)
//! - Bound every call with the configured timeout
//! - Report reachability on the `adt_rpc_healthy` gauge after every call

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionReceipt};
use alloy::transports::TransportResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::ChainId;
use crate::config::ChainConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::observability::metrics;

/// Read-only chain client with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a client for the configured endpoints.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: ChainConfig) -> DashboardResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url = parse_rpc_url(&config.rpc_url)?;
        providers.push(ProviderBuilder::new().connect_http(primary_url).erased());

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(ProviderBuilder::new().connect_http(url).erased()),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::debug!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            "Chain client created"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Run `call` against each provider in turn until one answers in time.
    ///
    /// The health gauge is set once per call: up if any provider answered.
    async fn with_failover<T, F, Fut>(&self, what: &'static str, call: F) -> DashboardResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = String::from("no providers configured");
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_health(true);
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        provider_idx = i,
                        call = what,
                        error = %e,
                        "RPC error, trying next provider"
                    );
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(
                        provider_idx = i,
                        call = what,
                        "RPC timeout, trying next provider"
                    );
                    last_error = format!("timed out after {}s", self.config.rpc_timeout_secs);
                }
            }
        }
        metrics::record_rpc_health(false);
        Err(DashboardError::Network(format!(
            "all RPC providers failed to {}: {}",
            what, last_error
        )))
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> DashboardResult<ChainId> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> DashboardResult<u64> {
        self.with_failover("get block number", |p| async move { p.get_block_number().await })
            .await
    }

    /// Get the native-coin balance of an address.
    pub async fn get_balance(&self, address: Address) -> DashboardResult<U256> {
        self.with_failover("get balance", |p| async move { p.get_balance(address).await })
            .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> DashboardResult<Option<TransactionReceipt>> {
        self.with_failover("get receipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Get the timestamp of a block, `None` if the node does not know it.
    pub async fn get_block_timestamp(&self, block_number: u64) -> DashboardResult<Option<u64>> {
        let block = self
            .with_failover("get block", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Number(block_number)).await
            })
            .await?;
        Ok(block.map(|b| b.header.timestamp))
    }

    /// Fetch logs matching a filter.
    pub async fn get_logs(&self, filter: &Filter) -> DashboardResult<Vec<Log>> {
        self.with_failover("get logs", |p| {
            let filter = filter.clone();
            async move { p.get_logs(&filter).await }
        })
        .await
    }

    /// Get the underlying primary provider.
    pub fn provider(&self) -> DynProvider {
        self.providers[0].clone()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Primary RPC endpoint, used to build signing providers.
    pub fn primary_url(&self) -> DashboardResult<url::Url> {
        parse_rpc_url(&self.config.rpc_url)
    }
}

fn parse_rpc_url(raw: &str) -> DashboardResult<url::Url> {
    raw.parse()
        .map_err(|e| DashboardError::Network(format!("invalid RPC URL '{}': {}", raw, e)))
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::metrics::{
        Counter, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::{Arc, Mutex};

    /// Captures every value written to `adt_rpc_healthy`.
    #[derive(Clone, Default)]
    struct HealthGauge(Arc<Mutex<Vec<f64>>>);

    impl GaugeFn for HealthGauge {
        fn increment(&self, _value: f64) {}

        fn decrement(&self, _value: f64) {}

        fn set(&self, value: f64) {
            self.0.lock().unwrap().push(value);
        }
    }

    impl Recorder for HealthGauge {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
            if key.name() == "adt_rpc_healthy" {
                Gauge::from_arc(Arc::new(self.clone()))
            } else {
                Gauge::noop()
            }
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    fn unreachable_config() -> ChainConfig {
        ChainConfig {
            // Nothing listens on port 1.
            rpc_url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
        }
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = unreachable_config();
        config.rpc_url = "not a url".into();
        assert!(matches!(ChainClient::new(config), Err(DashboardError::Network(_))));
    }

    #[test]
    fn test_invalid_failover_is_skipped() {
        let mut config = unreachable_config();
        config.failover_urls.push("::bad::".into());
        config.failover_urls.push("http://127.0.0.1:2".into());
        let client = ChainClient::new(config).unwrap();
        assert_eq!(client.providers.len(), 2);
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        let mut config = unreachable_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = ChainClient::new(config).unwrap();

        let result = client.get_chain_id().await;
        match result {
            Err(DashboardError::Network(msg)) => {
                assert!(msg.contains("all RPC providers failed"))
            }
            other => panic!("expected network error, got {:?}", other),
        }
        assert!(client.get_block_number().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_call_marks_rpc_unhealthy() {
        let gauge = HealthGauge::default();
        // Single-threaded test runtime, so the thread-local recorder sees the call.
        let _guard = ::metrics::set_default_local_recorder(&gauge);

        let client = ChainClient::new(unreachable_config()).unwrap();
        assert!(client.get_block_number().await.is_err());

        assert_eq!(*gauge.0.lock().unwrap(), vec![0.0]);
    }
}
