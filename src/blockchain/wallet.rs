//! Local signing wallet with user approval.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Every account disclosure and every signature goes through the approver

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, Signer};
use std::sync::Arc;

use crate::blockchain::approval::{ApprovalRequest, Approver};
use crate::error::{DashboardError, DashboardResult};

/// Default environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "ADT_WALLET_PRIVATE_KEY";

/// A signing key plus the prompt that guards it.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
    /// Decides whether a request may proceed.
    approver: Arc<dyn Approver>,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    /// * `approver` - Prompt consulted before disclosing the account or signing
    pub fn from_private_key(
        private_key_hex: &str,
        chain_id: u64,
        approver: Arc<dyn Approver>,
    ) -> DashboardResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let mut signer: PrivateKeySigner = key_hex.parse().map_err(|e| {
            DashboardError::WalletUnavailable(format!("invalid private key format: {}", e))
        })?;
        signer.set_chain_id(Some(chain_id));

        tracing::info!(address = %signer.address(), chain_id, "Wallet key loaded");

        Ok(Self {
            signer,
            chain_id,
            approver,
        })
    }

    /// Load the key from the named environment variable.
    pub fn from_env(
        var: &str,
        chain_id: u64,
        approver: Arc<dyn Approver>,
    ) -> DashboardResult<Self> {
        let private_key = std::env::var(var).map_err(|_| {
            DashboardError::WalletUnavailable(format!("environment variable {} not set", var))
        })?;

        Self::from_private_key(&private_key, chain_id, approver)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Ask the approver; a refusal becomes [`DashboardError::UserRejected`].
    ///
    /// The prompt may block on the terminal, so it runs on the blocking pool.
    pub async fn approve(&self, request: &ApprovalRequest) -> DashboardResult<()> {
        let approver = self.approver.clone();
        let prompt = request.clone();
        let approved = tokio::task::spawn_blocking(move || approver.approve(&prompt))
            .await
            .map_err(|e| {
                DashboardError::WalletUnavailable(format!("approval prompt failed: {}", e))
            })?;

        if approved {
            Ok(())
        } else {
            tracing::info!(request = %request, "Request rejected by user");
            Err(DashboardError::UserRejected)
        }
    }

    /// Provider that fills nonce, gas and chain id and signs with this key.
    pub fn signing_provider(&self, rpc_url: url::Url) -> DynProvider {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(rpc_url)
            .erased()
    }

    /// Sign arbitrary message bytes (with Ethereum prefix) after approval.
    pub async fn sign_message(&self, message: &[u8]) -> DashboardResult<Signature> {
        self.approve(&ApprovalRequest::SignMessage {
            address: self.address(),
            preview: String::from_utf8_lossy(message).into_owned(),
        })
        .await?;
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| {
                DashboardError::WalletUnavailable(format!("message signing failed: {}", e))
            })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::approval::{AutoApprove, RejectAll};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers only once the test sends the decision.
    struct WaitForAnswer(Mutex<mpsc::Receiver<bool>>);

    impl Approver for WaitForAnswer {
        fn approve(&self, _request: &ApprovalRequest) -> bool {
            match self.0.lock() {
                Ok(rx) => rx.recv().unwrap_or(false),
                Err(_) => false,
            }
        }
    }

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn approving() -> Arc<dyn Approver> {
        Arc::new(AutoApprove)
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1, approving()).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(wallet.chain_id(), 1);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet =
            Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 1, approving()).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key", 1, approving());
        match result {
            Err(DashboardError::WalletUnavailable(msg)) => {
                assert!(msg.contains("invalid private key"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_env_var() {
        let result = Wallet::from_env("ADT_TEST_KEY_THAT_IS_NEVER_SET", 1, approving());
        assert!(matches!(result, Err(DashboardError::WalletUnavailable(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1, approving()).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains(TEST_PRIVATE_KEY));
    }

    #[tokio::test]
    async fn test_sign_message() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1, approving()).unwrap();
        let signature = wallet.sign_message(b"Hello, World!").await.unwrap();
        let recovered = signature
            .recover_address_from_msg(b"Hello, World!")
            .unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_rejected_signature() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1, Arc::new(RejectAll)).unwrap();
        let result = wallet.sign_message(b"Hello").await;
        assert_eq!(result.unwrap_err(), DashboardError::UserRejected);
    }

    #[tokio::test]
    async fn test_prompt_runs_off_the_runtime_thread() {
        let (tx, rx) = mpsc::channel();
        let wallet = Wallet::from_private_key(
            TEST_PRIVATE_KEY,
            1,
            Arc::new(WaitForAnswer(Mutex::new(rx))),
        )
        .unwrap();

        // On a current-thread runtime this task only runs if the prompt yields.
        let answer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.send(true).unwrap();
        });

        let request = ApprovalRequest::ConnectAccount {
            address: wallet.address(),
        };
        let result = tokio::time::timeout(Duration::from_secs(5), wallet.approve(&request)).await;
        answer.await.unwrap();
        assert_eq!(result.unwrap(), Ok(()));
    }
}
