//! Quay core types and domain logic
//!
//! Everything in this crate is framework-free: the navigation guard and
//! route table are pure functions over plain data, and all persistence
//! goes through the [`Store`] and [`KeyValueStore`] traits.

pub mod error;
pub mod kv;
pub mod navigation;
pub mod routes;
pub mod store;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use kv::{KeyValueStore, MemoryKv};
pub use navigation::{NavigationDecision, NavigationRequest, decide};
pub use routes::{RouteMatch, RouteTable, UnmatchedRouteHandler};
pub use store::Store;
