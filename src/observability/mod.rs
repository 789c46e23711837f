//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gatekeeper decisions, sweeps, upstream errors:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every request span by the HTTP layer
//! - Session cookie contents are never logged

pub mod logging;
pub mod metrics;
