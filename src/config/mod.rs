//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AlphaConfig (validated, immutable)
//!     → shared via Arc with the front controller, codec and filters
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no process-wide singleton
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AlphaConfig, AppConfig, BlacklistFilterConfig, FiltersConfig, ObservabilityConfig,
    SecurityConfig, TempBlacklistConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
