//! Active wallet session.

use alloy::primitives::Address;
use serde::Serialize;
use std::sync::Arc;

use crate::amount::{short_address, TokenAmount, NATIVE_DECIMALS};
use crate::blockchain::Network;
use crate::error::{DashboardError, DashboardResult};
use crate::session::provider::WalletProvider;

/// Snapshot of the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Active account (checksummed when displayed).
    pub address: Address,
    pub network: Network,
    /// Native-coin balance at the time of the last query.
    pub native_balance: TokenAmount,
}

impl Session {
    /// `0x1234...abcd` form for compact views.
    pub fn short_address(&self) -> String {
        short_address(&self.address.to_string())
    }
}

/// Owns the session for the lifetime of the process.
///
/// Nothing is persisted: a new process starts disconnected, and a failed
/// connect leaves no session behind.
pub struct SessionManager {
    provider: Arc<dyn WalletProvider>,
    active: Option<Session>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            active: None,
        }
    }

    /// Request account access and build the session from the first account.
    pub async fn connect(&mut self) -> DashboardResult<&Session> {
        self.active = None;

        let accounts = self.provider.request_accounts().await?;
        let address = *accounts.first().ok_or_else(|| {
            DashboardError::WalletUnavailable("wallet returned no accounts".to_string())
        })?;

        let network = self.query_network().await?;
        let native_balance = self.query_native_balance(address).await?;

        tracing::info!(
            address = %address,
            network = %network.name,
            chain_id = network.chain_id,
            "Wallet connected"
        );

        Ok(&*self.active.insert(Session {
            address,
            network,
            native_balance,
        }))
    }

    /// The connected session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Active account, or `WalletUnavailable` when disconnected.
    pub fn address(&self) -> DashboardResult<Address> {
        self.active
            .as_ref()
            .map(|s| s.address)
            .ok_or_else(|| DashboardError::WalletUnavailable("wallet not connected".to_string()))
    }

    /// Re-query network and native balance for the active account.
    pub async fn refresh(&mut self) -> DashboardResult<&Session> {
        let address = self.address()?;
        let network = self.query_network().await?;
        let native_balance = self.query_native_balance(address).await?;
        Ok(&*self.active.insert(Session {
            address,
            network,
            native_balance,
        }))
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.active.take() {
            tracing::info!(address = %session.address, "Wallet disconnected");
        }
    }

    async fn query_network(&self) -> DashboardResult<Network> {
        Ok(Network::from(self.provider.chain_id().await?))
    }

    async fn query_native_balance(&self, address: Address) -> DashboardResult<TokenAmount> {
        let raw = self.provider.native_balance(address).await?;
        Ok(TokenAmount::from_raw(raw, NATIVE_DECIMALS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ChainId;
    use alloy::primitives::U256;
    use alloy::signers::Signature;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FakeWallet {
        accounts: DashboardResult<Vec<Address>>,
        balance_wei: AtomicU64,
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        async fn request_accounts(&self) -> DashboardResult<Vec<Address>> {
            self.accounts.clone()
        }

        async fn chain_id(&self) -> DashboardResult<ChainId> {
            Ok(ChainId(11155111))
        }

        async fn native_balance(&self, _address: Address) -> DashboardResult<U256> {
            Ok(U256::from(self.balance_wei.load(Ordering::SeqCst)))
        }

        async fn sign_message(&self, _message: &[u8]) -> DashboardResult<Signature> {
            Err(DashboardError::UserRejected)
        }
    }

    fn fake(accounts: DashboardResult<Vec<Address>>) -> Arc<FakeWallet> {
        Arc::new(FakeWallet {
            accounts,
            balance_wei: AtomicU64::new(1_500_000_000_000_000_000),
        })
    }

    #[tokio::test]
    async fn test_connect_uses_first_account() {
        let first = Address::repeat_byte(0xaa);
        let mut manager = SessionManager::new(fake(Ok(vec![first, Address::repeat_byte(0xbb)])));

        let session = manager.connect().await.unwrap();
        assert_eq!(session.address, first);
        assert_eq!(session.network.name, "sepolia");
        assert_eq!(session.native_balance.to_string(), "1.5");
        assert_eq!(manager.address().unwrap(), first);
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_no_session() {
        let mut manager = SessionManager::new(fake(Err(DashboardError::UserRejected)));
        assert_eq!(manager.connect().await.unwrap_err(), DashboardError::UserRejected);
        assert!(manager.session().is_none());
        assert!(matches!(manager.address(), Err(DashboardError::WalletUnavailable(_))));

        let mut manager = SessionManager::new(fake(Ok(Vec::new())));
        assert!(matches!(
            manager.connect().await,
            Err(DashboardError::WalletUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_requeries_provider() {
        let wallet = fake(Ok(vec![Address::repeat_byte(0xaa)]));
        let mut manager = SessionManager::new(wallet.clone());
        manager.connect().await.unwrap();

        wallet.balance_wei.store(250_000_000_000_000_000, Ordering::SeqCst);
        let session = manager.refresh().await.unwrap();
        assert_eq!(session.native_balance.to_string(), "0.25");

        manager.disconnect();
        assert!(manager.refresh().await.is_err());
    }

    #[test]
    fn test_short_address() {
        let session = Session {
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap(),
            network: Network::from(ChainId(1)),
            native_balance: TokenAmount::from_raw(U256::ZERO, NATIVE_DECIMALS),
        };
        assert_eq!(session.short_address(), "0xf39F...2266");
    }
}
