//! Data models
//!
//! Shared between the server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs generated by Postgres.

pub mod pickup_point;
pub mod product;
pub mod reception;
pub mod role;
pub mod user;

// Re-exports
pub use pickup_point::*;
pub use product::*;
pub use reception::*;
pub use role::*;
pub use user::*;
