//! Chain-specific types.

use serde::{Deserialize, Serialize};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl ChainId {
    /// Human-readable network name, `"unknown"` for unlisted chains.
    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "mainnet",
            5 => "goerli",
            10 => "optimism",
            56 => "bnb",
            137 => "matic",
            8453 => "base",
            17000 => "holesky",
            31337 => "anvil",
            42161 => "arbitrum",
            11155111 => "sepolia",
            _ => "unknown",
        }
    }
}

/// The network a session is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

impl From<ChainId> for Network {
    fn from(id: ChainId) -> Self {
        Self {
            chain_id: id.0,
            name: id.name().to_string(),
        }
    }
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in mempool.
    Pending,
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u32, required: u32 },
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64 },
}
