//! HTTP surface for the Quay management API
//!
//! The `server` feature carries the axum routes, services, and middleware;
//! the `client` feature carries the outbound webhook client. Error and DTO
//! types are shared by both sides.

pub mod error;
pub mod types;

#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod state;

#[cfg(feature = "client")]
pub mod client;

pub use error::{HttpError, Result};

#[cfg(feature = "server")]
pub use server::Server;
#[cfg(feature = "server")]
pub use state::AppState;
