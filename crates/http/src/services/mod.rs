//! Services for the management API

pub mod auth;
pub mod jwt;
pub mod sshkeys;
pub mod token;

pub use auth::AuthService;
pub use jwt::{JwtConfig, JwtService, TokenKind};
pub use sshkeys::SshKeyService;
pub use token::ApiTokenService;

use sha2::{Digest, Sha256};

/// SHA-256 hex digest; used for password compare and id derivation
pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
