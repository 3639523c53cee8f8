//! Mapping of node and wallet failures onto [`DashboardError`].
//!
//! JSON-RPC errors only carry a numeric code and free-form text, so this is
//! the single place where that text is inspected.

use alloy::transports::{RpcError, TransportError};

use crate::error::DashboardError;

/// EIP-1193 "user rejected request".
const USER_REJECTED_CODE: i64 = 4001;
/// `eth_call`/`eth_estimateGas` execution reverted.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Classify a JSON-RPC error response.
pub fn classify_rpc_failure(code: i64, message: &str) -> DashboardError {
    let lower = message.to_ascii_lowercase();
    let rejected = lower.contains("user rejected") || lower.contains("user denied");
    if code == USER_REJECTED_CODE || rejected {
        DashboardError::UserRejected
    } else if lower.contains("insufficient funds") {
        DashboardError::InsufficientGas
    } else if code == EXECUTION_REVERTED_CODE || lower.contains("revert") {
        DashboardError::Reverted(message.to_string())
    } else {
        DashboardError::Network(format!("RPC error {}: {}", code, message))
    }
}

/// Classify a transport-level failure.
pub fn classify_transport_error(err: &TransportError) -> DashboardError {
    match err {
        RpcError::ErrorResp(payload) => classify_rpc_failure(payload.code, &payload.message),
        other => DashboardError::Network(other.to_string()),
    }
}

/// Classify a failure from a contract call or send.
pub fn classify_contract_error(err: alloy::contract::Error) -> DashboardError {
    match err {
        alloy::contract::Error::TransportError(e) => classify_transport_error(&e),
        other => DashboardError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection() {
        assert_eq!(
            classify_rpc_failure(4001, "MetaMask Tx Signature: User denied transaction signature."),
            DashboardError::UserRejected
        );
        assert_eq!(
            classify_rpc_failure(-32000, "user rejected the request"),
            DashboardError::UserRejected
        );
    }

    #[test]
    fn test_insufficient_gas() {
        assert_eq!(
            classify_rpc_failure(-32000, "insufficient funds for gas * price + value"),
            DashboardError::InsufficientGas
        );
    }

    #[test]
    fn test_reverts() {
        assert!(matches!(
            classify_rpc_failure(3, "execution reverted: Pausable: paused"),
            DashboardError::Reverted(msg) if msg.contains("paused")
        ));
        assert!(matches!(
            classify_rpc_failure(-32603, "VM Exception while processing transaction: revert"),
            DashboardError::Reverted(_)
        ));
    }

    #[test]
    fn test_everything_else_is_network() {
        assert!(matches!(
            classify_rpc_failure(-32005, "rate limit exceeded"),
            DashboardError::Network(msg) if msg.contains("-32005")
        ));
    }
}
