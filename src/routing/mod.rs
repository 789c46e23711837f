//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (asset exclusion: skip gatekeeping entirely?)
//!     → classifier.rs (public / protected flags)
//!     → Return: RouteClassification
//!
//! Compilation (at startup):
//!     RoutesConfig / AssetsConfig
//!     → Build prefix and extension matchers
//!     → Freeze as immutable classifier
//! ```
//!
//! # Design Decisions
//! - Matchers built at startup, immutable at runtime
//! - Literal prefix matching only; no regex, no path parameters
//! - Existential match: list order never changes the result

pub mod classifier;
pub mod matcher;

pub use classifier::{RouteClassification, RouteClassifier};
pub use matcher::AssetExclusion;
