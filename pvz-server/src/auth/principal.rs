//! Authenticated principal and role gates
//!
//! Handlers take one of the gate extractors; the principal they carry is
//! the only source of request identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::Role;
use shared::{AppError, ErrorCode};
use uuid::Uuid;

use super::AuthError;
use crate::state::AppState;

/// Identity of the caller, taken from a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    /// Fails with 403 unless the principal holds one of `allowed`
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        tracing::debug!(user_id = %self.user_id, role = %self.role, "Role not permitted");
        Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            format!("access denied for role {}", self.role),
        ))
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenExpired => AppError::token_expired(),
            AuthError::InvalidToken(_) => AppError::invalid_token("Invalid token"),
            AuthError::Hashing(_) | AuthError::TokenCreation(_) => {
                tracing::error!(error = %e, "Credential service failure");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(*principal);
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::not_authenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        let principal = state.credentials.parse_token(token).map_err(|e| {
            tracing::debug!(error = %e, uri = %parts.uri, "Token rejected");
            AppError::from(e)
        })?;
        parts.extensions.insert(principal);
        Ok(principal)
    }
}

macro_rules! role_gate {
    ($(#[$meta:meta])* $name:ident, [$($role:expr),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub Principal);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let principal = Principal::from_request_parts(parts, state).await?;
                principal.require(&[$($role),+])?;
                Ok(Self(principal))
            }
        }
    };
}

role_gate!(
    /// Moderators only
    RequireModerator,
    [Role::Moderator]
);
role_gate!(
    /// Employees only
    RequireEmployee,
    [Role::Employee]
);
role_gate!(
    /// Any authenticated staff member
    RequireStaff,
    [Role::Moderator, Role::Employee]
);
