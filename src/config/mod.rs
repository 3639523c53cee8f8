//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! adt.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DashboardConfig (validated, immutable)
//!     → handed by value to each component at construction
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ChainConfig, DashboardConfig, HistoryConfig, ObservabilityConfig, PriceConfig, StorageConfig,
    TokenConfig, TransferConfig, WalletConfig,
};
