//! Price display subsystem.
//!
//! # Data Flow
//! ```text
//! prices.api_url
//!     → feed.rs (one HTTP fetch → PriceSnapshot, missing fields = 0)
//!     → ticker.rs (interval refresh → watch channel, stale on failure)
//!     → types.rs (ticker line / detailed rows)
//! ```

pub mod feed;
pub mod ticker;
pub mod types;

pub use feed::PriceFeed;
pub use ticker::{PriceSource, PriceTicker, TickerSubscription};
pub use types::{format_change, PriceQuote, PriceSnapshot};
