//! Shared types for the PVZ backend
//!
//! Domain records, wire payloads and the unified error system used by the
//! server and by API clients.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, ErrorCode};
pub use http;
