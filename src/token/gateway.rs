//! Token contract gateway.
//!
//! # Responsibilities
//! - Bind the configured contract address to a read provider and, when a
//!   wallet is connected, to a signing provider
//! - Read calls: `balanceOf`, `decimals` (fetched once), token metadata
//! - Write call: `transfer`, gated by the wallet's approval prompt
//! - Poll receipts until a transfer is included
//! - Scan `Transfer` logs for an account in bounded block windows

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::{interval, timeout};

use crate::amount::format_units;
use crate::blockchain::{ApprovalRequest, ChainClient, ConfirmationStatus, Wallet};
use crate::config::{HistoryConfig, TokenConfig, TransferConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::token::abi::IERC20;
use crate::token::errors::classify_contract_error;
use crate::token::types::{Confirmation, TokenMetadata, TransferLog};

/// Read/write interface of the token contract.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    /// Address of the bound contract.
    fn contract_address(&self) -> Address;

    /// Display symbol.
    fn symbol(&self) -> &str;

    /// Name, symbol, decimals and total supply.
    async fn metadata(&self) -> DashboardResult<TokenMetadata>;

    /// Token decimals; constant for the contract's lifetime.
    async fn decimals(&self) -> DashboardResult<u8>;

    /// Raw balance of `owner`.
    async fn balance_of(&self, owner: Address) -> DashboardResult<U256>;

    /// Sign and broadcast `transfer(to, amount)`, returning the transaction hash.
    async fn transfer(&self, to: Address, amount: U256) -> DashboardResult<TxHash>;

    /// Wait until the transaction is included. Does not time out by itself.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> DashboardResult<Confirmation>;

    /// Every `Transfer` event where `account` is sender or recipient, oldest first.
    async fn transfer_events(&self, account: Address) -> DashboardResult<Vec<TransferLog>>;
}

/// Signing half of the gateway, present once a wallet is bound.
struct SignerBinding {
    wallet: Wallet,
    contract: IERC20::IERC20Instance<DynProvider>,
}

/// [`TokenGateway`] over a deployed ERC-20 contract.
pub struct Erc20Gateway {
    address: Address,
    symbol: String,
    client: ChainClient,
    contract: IERC20::IERC20Instance<DynProvider>,
    signer: Option<SignerBinding>,
    decimals: OnceCell<u8>,
    rpc_timeout: Duration,
    transfer: TransferConfig,
    history: HistoryConfig,
}

impl Erc20Gateway {
    /// Bind the contract for reads only.
    pub fn new(
        address: Address,
        token: &TokenConfig,
        transfer: TransferConfig,
        history: HistoryConfig,
        client: ChainClient,
    ) -> Self {
        let contract = IERC20::new(address, client.provider());
        Self {
            address,
            symbol: token.symbol.clone(),
            rpc_timeout: Duration::from_secs(client.config().rpc_timeout_secs),
            contract,
            client,
            signer: None,
            decimals: OnceCell::new_with(token.decimals_override),
            transfer,
            history,
        }
    }

    /// Bind a wallet so `transfer` can sign.
    pub fn with_signer(mut self, wallet: Wallet) -> DashboardResult<Self> {
        let provider = wallet.signing_provider(self.client.primary_url()?);
        tracing::info!(
            contract = %self.address,
            signer = %wallet.address(),
            "Token gateway bound to signer"
        );
        self.signer = Some(SignerBinding {
            contract: IERC20::new(self.address, provider),
            wallet,
        });
        Ok(self)
    }

    /// Bound a read call by the RPC timeout.
    async fn bounded<T, F>(&self, call: F) -> DashboardResult<T>
    where
        F: IntoFuture<Output = Result<T, alloy::contract::Error>>,
    {
        match timeout(self.rpc_timeout, call.into_future()).await {
            Ok(result) => result.map_err(classify_contract_error),
            Err(_) => Err(DashboardError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    /// One receipt check for a submitted transaction.
    pub async fn confirmation_status(
        &self,
        tx_hash: TxHash,
    ) -> DashboardResult<ConfirmationStatus> {
        let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
            Some(r) => r,
            None => return Ok(ConfirmationStatus::Pending),
        };

        if !receipt.status() {
            return Err(DashboardError::Reverted(format!(
                "transaction {} reverted on-chain",
                tx_hash
            )));
        }

        let current_block = self.client.get_block_number().await?;
        let tx_block = receipt.block_number.unwrap_or(current_block);
        Ok(confirmation_depth(
            tx_block,
            current_block,
            self.transfer.confirmation_blocks,
        ))
    }

    async fn block_timestamps(
        &self,
        logs: &BTreeMap<(u64, u64), TransferLog>,
    ) -> HashMap<u64, u64> {
        let mut timestamps = HashMap::new();
        for log in logs.values() {
            if let Some(ts) = log.timestamp {
                timestamps.insert(log.block_number, ts);
            }
        }
        let missing: BTreeSet<u64> = logs
            .values()
            .map(|log| log.block_number)
            .filter(|block| !timestamps.contains_key(block))
            .collect();
        for block in missing {
            match self.client.get_block_timestamp(block).await {
                Ok(Some(ts)) => {
                    timestamps.insert(block, ts);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(block, error = %e, "Could not fetch block timestamp");
                }
            }
        }
        timestamps
    }
}

#[async_trait]
impl TokenGateway for Erc20Gateway {
    fn contract_address(&self) -> Address {
        self.address
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn metadata(&self) -> DashboardResult<TokenMetadata> {
        let name = self.bounded(self.contract.name().call()).await?;
        let symbol = self.bounded(self.contract.symbol().call()).await?;
        let total_supply = self.bounded(self.contract.totalSupply().call()).await?;
        let decimals = self.decimals().await?;
        Ok(TokenMetadata {
            address: self.address,
            name,
            symbol,
            decimals,
            total_supply,
        })
    }

    async fn decimals(&self) -> DashboardResult<u8> {
        self.decimals
            .get_or_try_init(|| async {
                let decimals = self.bounded(self.contract.decimals().call()).await?;
                tracing::debug!(contract = %self.address, decimals, "Token decimals fetched");
                Ok::<u8, DashboardError>(decimals)
            })
            .await
            .copied()
    }

    async fn balance_of(&self, owner: Address) -> DashboardResult<U256> {
        self.bounded(self.contract.balanceOf(owner).call()).await
    }

    async fn transfer(&self, to: Address, amount: U256) -> DashboardResult<TxHash> {
        let binding = self.signer.as_ref().ok_or_else(|| {
            DashboardError::WalletUnavailable("no wallet bound to the token gateway".to_string())
        })?;
        let decimals = self.decimals().await?;

        binding
            .wallet
            .approve(&ApprovalRequest::SignTransfer {
                from: binding.wallet.address(),
                to,
                amount: format_units(amount, decimals),
                symbol: self.symbol.clone(),
            })
            .await?;

        // A timeout here does not mean the node dropped the transaction.
        let call = binding.contract.transfer(to, amount);
        let pending = match timeout(self.rpc_timeout, call.send()).await {
            Ok(result) => result.map_err(classify_contract_error)?,
            Err(_) => {
                tracing::warn!(to = %to, "Transfer submission timed out");
                return Err(DashboardError::Timeout(self.rpc_timeout.as_secs()));
            }
        };
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            tx_hash = %tx_hash,
            from = %binding.wallet.address(),
            to = %to,
            amount = %amount,
            "Transfer submitted"
        );
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> DashboardResult<Confirmation> {
        let every = Duration::from_millis(self.transfer.receipt_poll_interval_ms);
        poll_confirmation(tx_hash, every, || self.confirmation_status(tx_hash)).await
    }

    async fn transfer_events(&self, account: Address) -> DashboardResult<Vec<TransferLog>> {
        let latest = self.client.get_block_number().await?;
        let windows = block_windows(self.history.from_block, latest, self.history.block_chunk_size);
        let mut found: BTreeMap<(u64, u64), TransferLog> = BTreeMap::new();

        for (start, end) in windows {
            let base = Filter::new()
                .address(self.address)
                .event(IERC20::Transfer::SIGNATURE)
                .from_block(start)
                .to_block(end);

            // Sent and received are separate topic filters so the node does the matching.
            for filter in [
                base.clone().topic1(account.into_word()),
                base.topic2(account.into_word()),
            ] {
                let logs = self.client.get_logs(&filter).await?;
                merge_logs(&mut found, logs.iter().filter_map(decode_transfer_log));
            }
        }

        let timestamps = self.block_timestamps(&found).await;
        tracing::debug!(account = %account, count = found.len(), "Transfer events loaded");

        Ok(found
            .into_values()
            .map(|mut log| {
                log.timestamp = timestamps.get(&log.block_number).copied();
                log
            })
            .collect())
    }
}

/// Inclusive block ranges covering `from..=latest`, each at most `chunk` blocks.
fn block_windows(from: u64, latest: u64, chunk: u64) -> Vec<(u64, u64)> {
    let chunk = chunk.max(1);
    let mut windows = Vec::new();
    let mut start = from;
    while start <= latest {
        let end = start.saturating_add(chunk - 1).min(latest);
        windows.push((start, end));
        if end == latest {
            break;
        }
        start = end + 1;
    }
    windows
}

/// Status of a successful receipt mined at `tx_block` with the head at `current_block`.
///
/// The inclusion block counts as the first confirmation.
fn confirmation_depth(tx_block: u64, current_block: u64, required: u32) -> ConfirmationStatus {
    let required = required.max(1);
    let depth = current_block.saturating_sub(tx_block).saturating_add(1);
    let current = u32::try_from(depth).unwrap_or(u32::MAX);

    if current >= required {
        ConfirmationStatus::Confirmed {
            block_number: tx_block,
        }
    } else {
        ConfirmationStatus::Confirming { current, required }
    }
}

fn decode_transfer_log(log: &Log) -> Option<TransferLog> {
    let decoded = match log.log_decode::<IERC20::Transfer>() {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable Transfer log");
            return None;
        }
    };
    let event = decoded.inner;
    Some(TransferLog {
        from: event.from,
        to: event.to,
        value: event.value,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
        tx_hash: log.transaction_hash.unwrap_or_default(),
        timestamp: log.block_timestamp,
    })
}

/// Add `logs` keyed by position; a self-transfer matches both filters and is kept once.
fn merge_logs(
    found: &mut BTreeMap<(u64, u64), TransferLog>,
    logs: impl IntoIterator<Item = TransferLog>,
) {
    for log in logs {
        found.entry((log.block_number, log.log_index)).or_insert(log);
    }
}

/// Run `check` every `every` until the transaction is confirmed.
///
/// Only a revert ends the wait. Failed lookups are logged and retried; the
/// caller bounds the total wait.
async fn poll_confirmation<F, Fut>(
    tx_hash: TxHash,
    every: Duration,
    mut check: F,
) -> DashboardResult<Confirmation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DashboardResult<ConfirmationStatus>>,
{
    let mut ticker = interval(every);

    loop {
        ticker.tick().await;

        match check().await {
            Ok(ConfirmationStatus::Confirmed { block_number }) => {
                tracing::info!(tx_hash = %tx_hash, block_number, "Transfer confirmed");
                return Ok(Confirmation {
                    tx_hash,
                    block_number,
                });
            }
            Ok(ConfirmationStatus::Pending) => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
            }
            Ok(ConfirmationStatus::Confirming { current, required }) => {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = current,
                    required,
                    "Waiting for confirmations"
                );
            }
            Err(e @ DashboardError::Reverted(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed, retrying");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::AutoApprove;
    use crate::config::ChainConfig;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn gateway_at(rpc_url: &str, decimals_override: Option<u8>) -> Erc20Gateway {
        let client = ChainClient::new(ChainConfig {
            rpc_url: rpc_url.to_string(),
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        })
        .unwrap();
        let token = TokenConfig {
            decimals_override,
            ..TokenConfig::default()
        };
        Erc20Gateway::new(
            Address::repeat_byte(0x42),
            &token,
            TransferConfig::default(),
            HistoryConfig::default(),
            client,
        )
    }

    fn gateway(decimals_override: Option<u8>) -> Erc20Gateway {
        gateway_at("http://127.0.0.1:1", decimals_override)
    }

    fn transfer_log(from: u8, to: u8, block_number: u64, log_index: u64) -> TransferLog {
        TransferLog {
            from: Address::repeat_byte(from),
            to: Address::repeat_byte(to),
            value: U256::from(1_000u64),
            block_number,
            log_index,
            tx_hash: TxHash::repeat_byte(block_number as u8),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_decimals_override_skips_rpc() {
        let gateway = gateway(Some(6));
        assert_eq!(gateway.decimals().await.unwrap(), 6);
        assert_eq!(gateway.symbol(), "ADT");
        assert_eq!(gateway.contract_address(), Address::repeat_byte(0x42));
    }

    #[tokio::test]
    async fn test_transfer_without_signer() {
        let gateway = gateway(Some(18));
        let result = gateway.transfer(Address::repeat_byte(1), U256::from(1u8)).await;
        assert!(matches!(result, Err(DashboardError::WalletUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_network_error() {
        let gateway = gateway(None);
        let result = gateway.balance_of(Address::ZERO).await;
        assert!(matches!(
            result,
            Err(DashboardError::Network(_)) | Err(DashboardError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_silent_node_times_out_submission() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let wallet =
            Wallet::from_private_key(TEST_PRIVATE_KEY, 31337, Arc::new(AutoApprove)).unwrap();
        let gateway = gateway_at(&format!("http://{}", addr), Some(18))
            .with_signer(wallet)
            .unwrap();

        let result = timeout(
            Duration::from_secs(10),
            gateway.transfer(Address::repeat_byte(1), U256::from(1u8)),
        )
        .await
        .expect("submission should be bounded by the RPC timeout");
        assert_eq!(result, Err(DashboardError::Timeout(1)));
    }

    #[test]
    fn test_block_windows_split_range() {
        assert_eq!(block_windows(0, 25, 10), vec![(0, 9), (10, 19), (20, 25)]);
        assert_eq!(block_windows(5, 5, 10), vec![(5, 5)]);
        assert_eq!(block_windows(0, 3, 0), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(
            block_windows(u64::MAX - 1, u64::MAX, 10),
            vec![(u64::MAX - 1, u64::MAX)]
        );
    }

    #[test]
    fn test_block_windows_start_past_head() {
        assert!(block_windows(100, 99, 10).is_empty());
    }

    #[test]
    fn test_self_transfer_kept_once() {
        let mut found = BTreeMap::new();
        // The same event comes back from the sender and the recipient filter.
        merge_logs(&mut found, vec![transfer_log(7, 7, 12, 0), transfer_log(7, 9, 10, 3)]);
        merge_logs(&mut found, vec![transfer_log(7, 7, 12, 0), transfer_log(2, 7, 12, 1)]);

        let keys: Vec<_> = found.keys().copied().collect();
        assert_eq!(keys, vec![(10, 3), (12, 0), (12, 1)]);
    }

    #[test]
    fn test_decode_transfer_log() {
        let event = IERC20::Transfer {
            from: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            value: U256::from(500u64),
        };
        let log = Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0x42),
                data: event.encode_log_data(),
            },
            block_number: Some(88),
            log_index: Some(4),
            transaction_hash: Some(TxHash::repeat_byte(9)),
            ..Default::default()
        };

        let decoded = decode_transfer_log(&log).unwrap();
        assert_eq!(decoded.from, Address::repeat_byte(1));
        assert_eq!(decoded.to, Address::repeat_byte(2));
        assert_eq!(decoded.value, U256::from(500u64));
        assert_eq!((decoded.block_number, decoded.log_index), (88, 4));
        assert_eq!(decoded.tx_hash, TxHash::repeat_byte(9));
    }

    #[test]
    fn test_confirmation_depth() {
        assert_eq!(
            confirmation_depth(100, 100, 1),
            ConfirmationStatus::Confirmed { block_number: 100 }
        );
        assert_eq!(
            confirmation_depth(100, 101, 3),
            ConfirmationStatus::Confirming {
                current: 2,
                required: 3
            }
        );
        assert_eq!(
            confirmation_depth(100, 102, 3),
            ConfirmationStatus::Confirmed { block_number: 100 }
        );
        // A provider whose head lags the receipt block.
        assert_eq!(
            confirmation_depth(100, 98, 2),
            ConfirmationStatus::Confirming {
                current: 1,
                required: 2
            }
        );
        assert_eq!(
            confirmation_depth(100, 100, 0),
            ConfirmationStatus::Confirmed { block_number: 100 }
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_waiting() {
        let calls = AtomicU32::new(0);
        let result = poll_confirmation(TxHash::ZERO, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Err(DashboardError::Network("all RPC providers failed".into())),
                    1 => Ok(ConfirmationStatus::Pending),
                    _ => Ok(ConfirmationStatus::Confirmed { block_number: 7 }),
                }
            }
        })
        .await;

        assert_eq!(
            result.unwrap(),
            Confirmation {
                tx_hash: TxHash::ZERO,
                block_number: 7
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_revert_ends_wait() {
        let calls = AtomicU32::new(0);
        let result = poll_confirmation(TxHash::ZERO, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DashboardError::Reverted("paused".into())) }
        })
        .await;

        assert!(matches!(result, Err(DashboardError::Reverted(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
