//! Transaction history reconstructed from `Transfer` event logs.

pub mod record;

pub use record::{build_history, load_history, Direction, TransferRecord};
