//! Authentication: password hashing, access tokens and the request principal

pub mod principal;
pub mod token;

use shared::models::Role;
use thiserror::Error;
use uuid::Uuid;

pub use principal::{Principal, RequireEmployee, RequireModerator, RequireStaff};
pub use token::AuthService;

/// Credential and token errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token generation failed: {0}")]
    TokenCreation(String),
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Password and token operations used by the controller and the extractor
pub trait Credentials: Send + Sync {
    /// Hash a password into a PHC string
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// `false` for a wrong password or an unparsable hash
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    fn issue_token(&self, user_id: Uuid, role: Role) -> Result<String, AuthError>;

    fn parse_token(&self, token: &str) -> Result<Principal, AuthError>;
}
