//! Token contract subsystem.
//!
//! # Data Flow
//! ```text
//! token.contract_address (adt.toml)
//!     → abi.rs (IERC20 bindings)
//!     → gateway.rs (reads, approval-gated transfer, receipts, Transfer logs)
//!     → errors.rs (node/wallet failures → DashboardError)
//! ```

pub mod abi;
pub mod errors;
pub mod gateway;
pub mod types;

pub use gateway::{Erc20Gateway, TokenGateway};
pub use types::{Confirmation, TokenMetadata, TransferLog};
