//! Database access layer
//!
//! [`PvzStore`] is the seam the controller depends on. [`PgStore`] is the
//! PostgreSQL implementation; each method delegates to the query functions
//! in the submodules.

pub mod error;
pub mod pickup_points;
pub mod products;
pub mod receptions;
pub mod users;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use shared::models::{PickupPoint, Product, Reception, Role, User};
use sqlx::PgPool;
use uuid::Uuid;

pub use error::{ConstraintKind, RepoError, classify};

use crate::read_model::{ListingWindow, PickupPointRow};

/// Persistent storage for users, pickup points, receptions and products
#[async_trait]
pub trait PvzStore: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Uuid, RepoError>;

    /// `RepoError::NotFound` when no user has this email
    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoError>;

    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint, RepoError>;

    /// Flat join rows ordered by pickup point, reception, product
    async fn list_pickup_points_paged(
        &self,
        window: &ListingWindow,
    ) -> Result<Vec<PickupPointRow>, RepoError>;

    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, RepoError>;

    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError>;

    async fn close_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError>;

    async fn add_product(&self, pvz_id: Uuid, product_type: &str)
    -> Result<Product, RepoError>;

    async fn delete_last_product(&self, pvz_id: Uuid) -> Result<(), RepoError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PvzStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Uuid, RepoError> {
        users::create(&self.pool, email, password_hash, role).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoError> {
        users::find_by_email(&self.pool, email).await
    }

    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint, RepoError> {
        pickup_points::create(&self.pool, city).await
    }

    async fn list_pickup_points_paged(
        &self,
        window: &ListingWindow,
    ) -> Result<Vec<PickupPointRow>, RepoError> {
        pickup_points::list_page(&self.pool, window).await
    }

    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, RepoError> {
        pickup_points::list_all(&self.pool).await
    }

    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError> {
        receptions::open(&self.pool, pvz_id).await
    }

    async fn close_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError> {
        receptions::close(&self.pool, pvz_id).await
    }

    async fn add_product(
        &self,
        pvz_id: Uuid,
        product_type: &str,
    ) -> Result<Product, RepoError> {
        products::add(&self.pool, pvz_id, product_type).await
    }

    async fn delete_last_product(&self, pvz_id: Uuid) -> Result<(), RepoError> {
        products::delete_last(&self.pool, pvz_id).await
    }
}
