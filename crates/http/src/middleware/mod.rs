pub mod auth;

pub use auth::{AuthProvider, AuthenticatedIdentity, auth_middleware};
