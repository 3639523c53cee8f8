//! Token transfer flow.
//!
//! # State Transitions
//! ```text
//! Idle → Validating → Submitting → AwaitingConfirmation → Settled
//!             ↓            ↓                ↓
//!          Failed       Failed           Failed
//! ```

pub mod flow;
pub mod state;

pub use flow::{parse_recipient, TransferFlow, TransferRequest};
pub use state::{TransferReceipt, TransferState};
