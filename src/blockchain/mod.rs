//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (private key), adt.toml (RPC URL)
//!     → wallet.rs (key loading, approval-gated signing)
//!     → client.rs (read-only RPC with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod approval;
pub mod client;
pub mod types;
pub mod wallet;

pub use approval::{ApprovalRequest, Approver, AutoApprove, RejectAll, TerminalApprover};
pub use client::ChainClient;
pub use types::{ChainId, ConfirmationStatus, Network};
pub use wallet::Wallet;
