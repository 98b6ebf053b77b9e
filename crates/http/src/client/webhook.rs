//! Incoming-connection webhook client
//!
//! Posts a signed event to the configured webhook endpoint when a new
//! connection reaches a device; the receiver can veto it with a 403.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const WEBHOOK_ID_HEADER: &str = "X-Webhook-Id";
pub const WEBHOOK_EVENT_HEADER: &str = "X-Webhook-Event";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Webhook-Signature";

pub const INCOMING_CONNECTION_EVENT: &str = "incoming_connection";

/// Transport errors retry up to this many additional attempts
const RETRY_MAX: usize = 3;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("request signing failed")]
    Signing,

    #[error("connection failed")]
    ConnectionFailed,

    #[error("not allowed")]
    Forbidden,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unknown error (status {0})")]
    Unknown(u16),
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Shared secret the signature is computed with
    pub secret: String,
}

impl WebhookConfig {
    fn endpoint(&self) -> String {
        format!("{}://{}:{}/", self.scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingConnectionRequest {
    pub username: String,
    pub hostname: String,
    pub namespace: String,
    pub source_ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingConnectionResponse {
    /// Username the receiver wants the connection to proceed as
    pub username: String,
}

pub struct WebhookClient {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Notify the receiver of an incoming connection
    pub async fn connect(
        &self,
        request: &IncomingConnectionRequest,
    ) -> Result<IncomingConnectionResponse, WebhookError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| WebhookError::InvalidResponse(e.to_string()))?;
        let signature = sign(self.config.secret.as_bytes(), &body)?;
        let endpoint = self.config.endpoint();

        let mut attempt = 0;
        let response = loop {
            let result = self
                .http
                .post(&endpoint)
                .header(WEBHOOK_ID_HEADER, Uuid::new_v4().to_string())
                .header(WEBHOOK_EVENT_HEADER, INCOMING_CONNECTION_EVENT)
                .header(WEBHOOK_SIGNATURE_HEADER, &signature)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await;

            match result {
                Ok(response) => break response,
                Err(err) if attempt < RETRY_MAX && (err.is_connect() || err.is_timeout()) => {
                    attempt += 1;
                    debug!(%err, attempt, "retrying webhook delivery");
                }
                Err(_) => return Err(WebhookError::ConnectionFailed),
            }
        };

        match response.status() {
            reqwest::StatusCode::OK => response
                .json()
                .await
                .map_err(|e| WebhookError::InvalidResponse(e.to_string())),
            reqwest::StatusCode::FORBIDDEN => Err(WebhookError::Forbidden),
            status => Err(WebhookError::Unknown(status.as_u16())),
        }
    }
}

/// HMAC-SHA256 hex signature over the raw request body
fn sign(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::Signing)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
