//! Library lending backend.
//!
//! The lending core lives in [`domain`]; [`inbound`] exposes it over HTTP and
//! [`outbound`] provides the PostgreSQL and in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
