//! pvz-server: pickup points, receptions and products
//!
//! - Storage engine enforcing the reception lifecycle with row locks (`db`)
//! - Application service translating storage outcomes (`service`)
//! - REST API with role-gated endpoints (`api`)
//! - gRPC pickup point listing (`grpc`)

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod read_model;
pub mod service;
pub mod state;

pub use config::Config;
pub use state::AppState;
