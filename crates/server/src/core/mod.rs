//! Core Service Layer
//!
//! Shared infrastructure for the server: authentication, configuration,
//! error mapping, request context, routing and document storage.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod extract;
pub mod router;
pub mod shutdown;
pub mod store;

// Re-exports for convenience
pub use config::{AppState, ServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use extract::JsonBody;
pub use router::router;
