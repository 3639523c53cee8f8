//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! user "connect"
//!     → provider.rs (WalletProvider: account request, network, balance)
//!     → manager.rs (SessionManager keeps the Session until disconnect/exit)
//! ```

pub mod manager;
pub mod provider;

pub use manager::{Session, SessionManager};
pub use provider::{LocalWalletProvider, WalletProvider};
