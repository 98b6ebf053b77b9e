//! JWT service for token management

use crate::error::HttpError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Audience discriminator carried in the `claims` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    User,
    Device,
    Token,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id, device uid, or namespace-token id
    pub sub: String,
    #[serde(rename = "claims")]
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default)]
    pub admin: bool,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// JWT service configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration duration
    pub expiration: Duration,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    /// User sessions last 72 hours by default
    pub fn new(secret: String, expiration_hours: i64, issuer: String) -> Self {
        Self {
            secret,
            expiration: Duration::hours(expiration_hours),
            issuer,
        }
    }
}

/// JWT service for token operations
pub struct JwtService {
    config: Arc<JwtConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for an interactive user session
    pub fn user_token(
        &self,
        user_id: &str,
        username: &str,
        tenant: Option<&str>,
    ) -> Result<String, HttpError> {
        self.generate(
            user_id,
            TokenKind::User,
            Some(username.to_string()),
            tenant.map(str::to_string),
        )
    }

    /// Generate a token for an enrolled device
    pub fn device_token(&self, uid: &str) -> Result<String, HttpError> {
        self.generate(uid, TokenKind::Device, None, None)
    }

    /// Generate a read-only namespace API token
    pub fn namespace_token(&self, id: &str, tenant: &str) -> Result<String, HttpError> {
        self.generate(id, TokenKind::Token, None, Some(tenant.to_string()))
    }

    fn generate(
        &self,
        sub: &str,
        kind: TokenKind,
        username: Option<String>,
        tenant: Option<String>,
    ) -> Result<String, HttpError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration;

        let claims = Claims {
            sub: sub.to_string(),
            kind,
            username,
            tenant,
            admin: kind == TokenKind::User,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| HttpError::InternalServerError(format!("Failed to generate token: {e}")))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, HttpError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.config.issuer));

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    HttpError::AuthenticationFailed("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    HttpError::AuthenticationFailed("Invalid token".to_string())
                }
                _ => HttpError::AuthenticationFailed(format!("Token validation failed: {e}")),
            })
    }

    /// Extract token from Authorization header
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, HttpError> {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            Ok(token)
        } else {
            Err(HttpError::AuthenticationFailed(
                "Invalid authorization header format".to_string(),
            ))
        }
    }

    /// Get the token expiration duration
    pub fn expiration(&self) -> Duration {
        self.config.expiration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::new(
            "test-secret".to_string(),
            72,
            "quay".to_string(),
        ))
    }

    #[test]
    fn user_token_round_trips() {
        let service = service();
        let token = service.user_token("u1", "alice", Some("t1")).unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.kind, TokenKind::User);
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.tenant.as_deref(), Some("t1"));
        assert!(claims.admin);
    }

    #[test]
    fn device_token_carries_device_audience() {
        let service = service();
        let token = service.device_token("deadbeef").unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Device);
        assert_eq!(claims.username, None);
        assert!(!claims.admin);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service();

        let past = Utc::now() - Duration::hours(1);
        let claims = Claims {
            sub: "u1".to_string(),
            kind: TokenKind::User,
            username: None,
            tenant: None,
            admin: false,
            exp: past.timestamp(),
            iat: past.timestamp(),
            iss: "quay".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &service.encoding_key,
        )
        .unwrap();

        match service.validate_token(&token) {
            Err(HttpError::AuthenticationFailed(msg)) => {
                assert!(msg.to_lowercase().contains("expired"));
            }
            other => panic!("expected authentication failure, got {other:?}"),
        }
    }

    #[test]
    fn issuer_mismatch_is_rejected() {
        let service = service();
        let other = JwtService::new(JwtConfig::new(
            "test-secret".to_string(),
            72,
            "someone-else".to_string(),
        ));
        let token = other.user_token("u1", "alice", None).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn extract_bearer_token_requires_scheme() {
        let service = service();
        assert_eq!(
            service.extract_bearer_token("Bearer abc123").unwrap(),
            "abc123"
        );
        assert!(service.extract_bearer_token("Basic abc123").is_err());
        assert!(service.extract_bearer_token("abc123").is_err());
    }
}
