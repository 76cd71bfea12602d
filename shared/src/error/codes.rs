//! Unified error codes for the PVZ backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Pickup point errors
//! - 4xxx: Reception errors
//! - 5xxx: Product errors
//! - 6xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 3xxx: Pickup point ====================
    /// Pickup point not found
    PickupPointNotFound = 3001,
    /// City is not one of the served cities
    InvalidCity = 3002,

    // ==================== 4xxx: Reception ====================
    /// A reception is already in progress for the pickup point
    ReceptionStillOpen = 4001,
    /// The last reception of the pickup point is already closed
    ReceptionAlreadyClosed = 4002,
    /// No reception is in progress for the pickup point
    NoActiveReception = 4003,

    // ==================== 5xxx: Product ====================
    /// Product type is not accepted
    InvalidProductType = 5001,
    /// Active reception has no products to delete
    NoItems = 5002,

    // ==================== 6xxx: User ====================
    /// Email is already registered
    EmailAlreadyRegistered = 6001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Request deadline exceeded
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the client-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::NotAuthenticated => "Authorization header is missing",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Not authorized for this role",

            // Pickup point
            ErrorCode::PickupPointNotFound => "Pickup point not found",
            ErrorCode::InvalidCity => "City is not valid",

            // Reception
            ErrorCode::ReceptionStillOpen => "Reception still open",
            ErrorCode::ReceptionAlreadyClosed => "Reception already closed",
            ErrorCode::NoActiveReception => "No active reception",

            // Product
            ErrorCode::InvalidProductType => "Type is not valid",
            ErrorCode::NoItems => "No items to delete",

            // User
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::TimeoutError => "Request timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            // Pickup point
            3001 => Ok(ErrorCode::PickupPointNotFound),
            3002 => Ok(ErrorCode::InvalidCity),

            // Reception
            4001 => Ok(ErrorCode::ReceptionStillOpen),
            4002 => Ok(ErrorCode::ReceptionAlreadyClosed),
            4003 => Ok(ErrorCode::NoActiveReception),

            // Product
            5001 => Ok(ErrorCode::InvalidProductType),
            5002 => Ok(ErrorCode::NoItems),

            // User
            6001 => Ok(ErrorCode::EmailAlreadyRegistered),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
