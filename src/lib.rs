//! ADT token dashboard library.
//!
//! Wallet session, token gateway, transfer flow, history, prices and the
//! community widgets behind the `adt` command.

pub mod amount;
pub mod blockchain;
pub mod community;
pub mod config;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod observability;
pub mod prices;
pub mod session;
pub mod token;
pub mod transfer;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use lifecycle::Shutdown;
