//! Transfer flow states.
//!
//! # State Transitions
//! ```text
//! Idle → Validating → Submitting → AwaitingConfirmation → Settled
//!   any of the above → Failed(reason)
//! ```

use alloy::primitives::TxHash;
use serde::Serialize;

use crate::amount::TokenAmount;
use crate::error::DashboardError;

/// Where a transfer attempt currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    /// Nothing in progress.
    Idle,
    /// Checking recipient, amount and balance.
    Validating,
    /// Waiting for the wallet to sign and the node to accept.
    Submitting,
    /// Broadcast; waiting for inclusion.
    AwaitingConfirmation { tx_hash: TxHash },
    /// Included in a block.
    Settled(TransferReceipt),
    /// The attempt ended; the user has to start a new one.
    Failed(DashboardError),
}

impl TransferState {
    /// Settled and failed attempts are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Settled(_) | TransferState::Failed(_))
    }

    /// Status line for the transfer view.
    pub fn status_message(&self) -> String {
        match self {
            TransferState::Idle => String::new(),
            TransferState::Validating | TransferState::Submitting => "Processing...".to_string(),
            TransferState::AwaitingConfirmation { .. } => {
                "Transaction sent... waiting for confirmation.".to_string()
            }
            TransferState::Settled(_) => "Transfer successful!".to_string(),
            TransferState::Failed(e) => e.status_message(),
        }
    }
}

/// Outcome of a settled transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub amount: TokenAmount,
    /// Balance re-read after inclusion; `None` if that read failed.
    pub new_balance: Option<TokenAmount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TransferState::Idle.is_terminal());
        assert!(!TransferState::Submitting.is_terminal());
        assert!(TransferState::Failed(DashboardError::UserRejected).is_terminal());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            TransferState::AwaitingConfirmation { tx_hash: TxHash::ZERO }.status_message(),
            "Transaction sent... waiting for confirmation."
        );
        assert_eq!(
            TransferState::Failed(DashboardError::InsufficientGas).status_message(),
            "Transfer failed: insufficient funds for gas."
        );
    }
}
