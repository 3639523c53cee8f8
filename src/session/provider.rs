//! Wallet provider boundary.
//!
//! The dashboard never holds keys itself; it asks a [`WalletProvider`] for
//! accounts, network and balances, the way a web page asks an injected
//! wallet. [`LocalWalletProvider`] backs the boundary with a key from the
//! environment and an approval prompt.

use alloy::primitives::{Address, U256};
use alloy::signers::Signature;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::{ApprovalRequest, Approver, ChainClient, ChainId, Wallet};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};

/// Capability interface of a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. The first entry is the active account.
    async fn request_accounts(&self) -> DashboardResult<Vec<Address>>;

    /// Chain the wallet is connected to.
    async fn chain_id(&self) -> DashboardResult<ChainId>;

    /// Native-coin balance in wei.
    async fn native_balance(&self, address: Address) -> DashboardResult<U256>;

    /// Sign an off-chain message with the active account.
    async fn sign_message(&self, message: &[u8]) -> DashboardResult<Signature>;
}

/// Wallet provider backed by a locally loaded key.
pub struct LocalWalletProvider {
    /// Loaded key, or why none is available.
    wallet: Result<Wallet, String>,
    client: ChainClient,
}

impl LocalWalletProvider {
    pub fn new(client: ChainClient, wallet: DashboardResult<Wallet>) -> Self {
        let wallet = wallet.map_err(|e| match e {
            DashboardError::WalletUnavailable(reason) => reason,
            other => other.to_string(),
        });
        if let Err(reason) = &wallet {
            tracing::debug!(reason = %reason, "No wallet key available");
        }
        Self { wallet, client }
    }

    /// Build the chain client and load the key named in the configuration.
    pub fn from_config(
        config: &DashboardConfig,
        approver: Arc<dyn Approver>,
    ) -> DashboardResult<Self> {
        let client = ChainClient::new(config.chain.clone())?;
        let wallet = Wallet::from_env(
            &config.wallet.private_key_env,
            config.chain.chain_id,
            approver,
        );
        Ok(Self::new(client, wallet))
    }

    /// The loaded wallet, for binding a signing gateway.
    pub fn wallet(&self) -> DashboardResult<&Wallet> {
        self.wallet
            .as_ref()
            .map_err(|reason| DashboardError::WalletUnavailable(reason.clone()))
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn request_accounts(&self) -> DashboardResult<Vec<Address>> {
        let wallet = self.wallet()?;
        wallet
            .approve(&ApprovalRequest::ConnectAccount {
                address: wallet.address(),
            })
            .await?;
        Ok(vec![wallet.address()])
    }

    async fn chain_id(&self) -> DashboardResult<ChainId> {
        self.client.get_chain_id().await
    }

    async fn native_balance(&self, address: Address) -> DashboardResult<U256> {
        self.client.get_balance(address).await
    }

    async fn sign_message(&self, message: &[u8]) -> DashboardResult<Signature> {
        self.wallet()?.sign_message(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{AutoApprove, RejectAll};
    use crate::config::ChainConfig;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn client() -> ChainClient {
        ChainClient::new(ChainConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_no_key_means_wallet_unavailable() {
        let provider = LocalWalletProvider::new(
            client(),
            Err(DashboardError::WalletUnavailable("environment variable X not set".into())),
        );
        match provider.request_accounts().await {
            Err(DashboardError::WalletUnavailable(reason)) => assert!(reason.contains("not set")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(provider.wallet().is_err());
    }

    #[tokio::test]
    async fn test_approved_account_request() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337, Arc::new(AutoApprove));
        let provider = LocalWalletProvider::new(client(), wallet);
        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(
            accounts[0].to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_dismissed_account_request() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337, Arc::new(RejectAll));
        let provider = LocalWalletProvider::new(client(), wallet);
        assert_eq!(
            provider.request_accounts().await.unwrap_err(),
            DashboardError::UserRejected
        );
    }
}
