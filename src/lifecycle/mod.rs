//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → background loops exit → subscriptions drop
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
