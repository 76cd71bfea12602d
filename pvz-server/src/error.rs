//! Unified service-layer error type
//!
//! `ServiceError` sits between storage/credential errors and the client-facing
//! `AppError`. Typed storage outcomes become business errors with their own
//! `ErrorCode`; anything opaque is logged once and replaced by a generic
//! internal error.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::auth::AuthError;
use crate::db::RepoError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: database or infrastructure error (logged, mapped to InternalError)
/// - `App`: business-rule error (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        let code = match e {
            RepoError::NotFound => ErrorCode::NotFound,
            RepoError::InvalidCity => ErrorCode::InvalidCity,
            RepoError::InvalidType => ErrorCode::InvalidProductType,
            RepoError::ReceptionStillOpen => ErrorCode::ReceptionStillOpen,
            RepoError::ReceptionAlreadyClosed => ErrorCode::ReceptionAlreadyClosed,
            RepoError::NoActiveReception => ErrorCode::NoActiveReception,
            RepoError::NoItems => ErrorCode::NoItems,
            RepoError::PickupPointNotFound => ErrorCode::PickupPointNotFound,
            RepoError::DuplicateEmail => ErrorCode::EmailAlreadyRegistered,
            RepoError::Db(db) => return ServiceError::Db(db.into()),
        };
        ServiceError::App(AppError::new(code))
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Hashing(_) | AuthError::TokenCreation(_) => ServiceError::Db(e.into()),
            other => ServiceError::App(other.into()),
        }
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service infrastructure error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
