//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → request.rs (request id)
//!     → middleware/gatekeeper.rs (policy decision)
//!         ├─ response.rs (429, redirect, preflight)
//!         └─ upstream.rs (forward to the dashboard) → security headers
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{build_router, HttpServer, ServerError};
