//! # rota-api
//!
//! HTTP composition layer for the Rota lab-room reservation service.
//!
//! This crate provides the API surface for Rota, handling:
//!
//! - **Routing**: HTTP endpoint configuration
//! - **Service Wiring**: Composition of the reservation writer and reader
//! - **Observability**: Request IDs, tracing, and health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer** with no domain policy.
//! All reservation logic lives in `rota-ledger` over `rota-core`.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health              - Health check
//! GET  /ready               - Readiness check
//! GET  /api/v1/status       - Admission window status
//! GET  /api/v1/rooms        - Room catalog
//! POST /api/v1/bookings     - Submit a reservation batch
//! GET  /api/v1/bookings     - Bookings in a date range
//! GET  /api/v1/schedule     - Classified week schedule
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rota_api::server::Server;
//!
//! let server = Server::builder()
//!     .http_port(8080)
//!     .debug(true)
//!     .build();
//!
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}
