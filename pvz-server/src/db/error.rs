//! Storage-layer errors and SQLSTATE classification
//!
//! Only this module knows Postgres error codes. Everything above the
//! storage layer sees either a typed [`RepoError`] variant or an opaque
//! [`RepoError::Db`].

use thiserror::Error;

/// Errors returned by the storage engine
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("city is not valid")]
    InvalidCity,
    #[error("type is not valid")]
    InvalidType,
    #[error("reception still open")]
    ReceptionStillOpen,
    #[error("reception already closed")]
    ReceptionAlreadyClosed,
    #[error("no active reception")]
    NoActiveReception,
    #[error("no items")]
    NoItems,
    #[error("pickup point not found")]
    PickupPointNotFound,
    #[error("email already registered")]
    DuplicateEmail,
    /// Connection failures, unrecognized constraint violations, commit failures
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Kind of constraint a low-level failure violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Value rejected by an enum type (22P02)
    InvalidEnumValue,
    /// Unique index violated (23505)
    UniqueViolation,
    /// Referenced row missing (23503)
    ForeignKeyViolation,
    /// CHECK constraint failed (23514)
    CheckViolation,
    /// Concurrent update under REPEATABLE READ (40001)
    SerializationFailure,
}

impl ConstraintKind {
    fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "22P02" => Some(Self::InvalidEnumValue),
            "23505" => Some(Self::UniqueViolation),
            "23503" => Some(Self::ForeignKeyViolation),
            "23514" => Some(Self::CheckViolation),
            "40001" => Some(Self::SerializationFailure),
            _ => None,
        }
    }
}

/// Classify a driver error, `None` means opaque
pub fn classify(err: &sqlx::Error) -> Option<ConstraintKind> {
    let db_err = err.as_database_error()?;
    let code = db_err.code()?;
    ConstraintKind::from_sqlstate(&code)
}

impl RepoError {
    /// Map a failure through `f` when it is a recognized constraint kind,
    /// otherwise keep it opaque.
    pub(crate) fn classify_with(
        err: sqlx::Error,
        f: impl FnOnce(ConstraintKind) -> Option<RepoError>,
    ) -> RepoError {
        match classify(&err).and_then(f) {
            Some(typed) => typed,
            None => RepoError::Db(err),
        }
    }
}
