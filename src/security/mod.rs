//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity.rs (peer address / X-Forwarded-For / anonymous)
//!     → rate_limit.rs (fixed-window counter per identifier)
//!     → session.rs (auth signal from the session cookie)
//! Allowed response:
//!     → headers.rs (security + CORS headers)
//! ```
//!
//! # Design Decisions
//! - Rate limit rejection is a normal response, not an error
//! - Unreadable session state is treated as "not authenticated"
//! - No trust placed in the session cookie beyond page redirects

pub mod headers;
pub mod identity;
pub mod rate_limit;
pub mod session;

pub use headers::apply_security_headers;
pub use identity::client_identifier;
pub use rate_limit::{spawn_sweeper, RateLimitEntry, RateLimitRegistry};
pub use session::SessionResolver;
