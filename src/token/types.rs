//! Token gateway data types.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;

/// Static token facts read from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

impl TokenMetadata {
    pub fn total_supply_amount(&self) -> TokenAmount {
        TokenAmount::from_raw(self.total_supply, self.decimals)
    }
}

/// A decoded `Transfer` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLog {
    pub from: Address,
    pub to: Address,
    /// Raw token units.
    pub value: U256,
    pub block_number: u64,
    pub log_index: u64,
    pub tx_hash: TxHash,
    /// Block timestamp (seconds since epoch), when the node reported one.
    pub timestamp: Option<u64>,
}

/// A transfer that made it into a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
}
