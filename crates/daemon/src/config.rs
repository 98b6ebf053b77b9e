//! Configuration management for the Quay daemon

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// HTTP server configuration
    pub http: HttpConfig,

    /// Token signing configuration
    pub auth: AuthConfig,

    /// Optional account seeded at startup
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind the management API to
    pub bind_addr: SocketAddr,

    /// Enable CORS for the web dashboard
    pub cors_enabled: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret the session tokens are signed with
    pub jwt_secret: String,

    /// Session token lifetime in hours
    pub token_expiration_hours: i64,

    /// Issuer claim stamped into every token
    pub issuer: String,
}

/// Account seeded into the store at startup. The in-memory backend starts
/// empty, so a fresh daemon is unusable without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub username: String,
    pub email: String,
    pub password: String,

    /// Namespace created for the account, if set
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_enabled: true,
            timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            token_expiration_hours: 72,
            issuer: "quay".to_string(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a file, with `QUAY__`-prefixed environment
    /// variables layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("QUAY").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from defaults and environment variables only
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("http.bind_addr", defaults.http.bind_addr.to_string())?
            .set_default("http.cors_enabled", defaults.http.cors_enabled)?
            .set_default("http.timeout_secs", defaults.http.timeout_secs)?
            .set_default("auth.jwt_secret", defaults.auth.jwt_secret)?
            .set_default(
                "auth.token_expiration_hours",
                defaults.auth.token_expiration_hours,
            )?
            .set_default("auth.issuer", defaults.auth.issuer)?
            .add_source(config::Environment::with_prefix("QUAY").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
