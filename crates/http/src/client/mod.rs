//! Outbound HTTP clients

pub mod webhook;

pub use webhook::{WebhookClient, WebhookConfig, WebhookError};
