//! Quay daemon: wires the in-memory store, services, and HTTP server

pub mod bootstrap;
pub mod config;

pub use config::DaemonConfig;
