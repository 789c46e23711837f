//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatekeeperConfig (validated, immutable)
//!     → consumed once at startup to build the gatekeeper
//! ```
//!
//! # Design Decisions
//! - Config is read at process start only; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AssetsConfig, GatekeeperConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    RoutesConfig, SessionConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
