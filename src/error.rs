//! Dashboard error taxonomy.
//!
//! Every failure a view can observe is one of these variants. Components
//! catch errors at their own boundary and turn them into a status line with
//! [`DashboardError::status_message`]; none of them is fatal to the rest of
//! the dashboard.

use thiserror::Error;

/// Errors surfaced by wallet, token, transfer, history and price components.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// No wallet (signing key) is available to connect to.
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The account request or signing prompt was declined.
    #[error("request rejected by user")]
    UserRejected,

    /// Destination is not a well-formed account identifier.
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Amount is missing, malformed or not strictly positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Requested amount exceeds the current balance (checked before signing).
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    /// The contract rejected the call.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The account cannot pay for gas.
    #[error("insufficient funds for gas")]
    InsufficientGas,

    /// RPC, price or history fetch failure.
    #[error("network error: {0}")]
    Network(String),

    /// An operation did not finish within its deadline.
    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

impl DashboardError {
    /// The one-line status a view shows for this error.
    pub fn status_message(&self) -> String {
        match self {
            DashboardError::WalletUnavailable(_) => {
                "Wallet not detected. Configure a signing key to connect.".to_string()
            }
            DashboardError::UserRejected => "Request was rejected in the wallet.".to_string(),
            DashboardError::InvalidRecipient(_) => "Invalid recipient address.".to_string(),
            DashboardError::InvalidAmount(_) => "Amount must be greater than 0.".to_string(),
            DashboardError::InsufficientBalance { .. } => "Insufficient balance.".to_string(),
            DashboardError::Reverted(_) => {
                "Transfer failed: transaction reverted. This could be due to insufficient balance or invalid parameters."
                    .to_string()
            }
            DashboardError::InsufficientGas => {
                "Transfer failed: insufficient funds for gas.".to_string()
            }
            DashboardError::Network(msg) => format!("Network error: {}", msg),
            DashboardError::Timeout(secs) => format!(
                "No confirmation after {} seconds. The transaction may still be mined.",
                secs
            ),
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::WalletUnavailable(_) => "wallet_unavailable",
            DashboardError::UserRejected => "user_rejected",
            DashboardError::InvalidRecipient(_) => "invalid_recipient",
            DashboardError::InvalidAmount(_) => "invalid_amount",
            DashboardError::InsufficientBalance { .. } => "insufficient_balance",
            DashboardError::Reverted(_) => "reverted",
            DashboardError::InsufficientGas => "insufficient_gas",
            DashboardError::Network(_) => "network",
            DashboardError::Timeout(_) => "timeout",
        }
    }
}

/// Result type for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
