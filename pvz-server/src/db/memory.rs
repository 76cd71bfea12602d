//! In-memory store for controller and router tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use shared::models::{PickupPoint, Product, Reception, ReceptionStatus, Role, User};
use uuid::Uuid;

use super::{PvzStore, RepoError};
use crate::read_model::{ListingWindow, PickupPointRow};

const CITIES: [&str; 3] = ["Moscow", "Saint Petersburg", "Kazan"];
const PRODUCT_TYPES: [&str; 3] = ["electronics", "clothes", "shoes"];

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    pickup_points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
}

impl Tables {
    fn open_reception_mut(&mut self, pvz_id: Uuid) -> Option<&mut Reception> {
        self.receptions
            .iter_mut()
            .find(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::InProgress)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// When set, every call fails with an opaque driver error
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, RepoError> {
        if self.fail {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(self.tables.lock().unwrap())
    }

    pub fn product_count(&self, reception_id: Uuid) -> usize {
        let tables = self.tables.lock().unwrap();
        tables
            .products
            .iter()
            .filter(|p| p.reception_id == reception_id)
            .count()
    }
}

#[async_trait]
impl PvzStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Uuid, RepoError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(RepoError::DuplicateEmail);
        }
        let id = Uuid::new_v4();
        tables.users.push(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        });
        Ok(id)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoError> {
        let tables = self.tables()?;
        tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint, RepoError> {
        if !CITIES.contains(&city) {
            return Err(RepoError::InvalidCity);
        }
        let mut tables = self.tables()?;
        let point = PickupPoint {
            id: Uuid::new_v4(),
            registration_date: Utc::now(),
            city: city.to_string(),
        };
        tables.pickup_points.push(point.clone());
        Ok(point)
    }

    async fn list_pickup_points_paged(
        &self,
        window: &ListingWindow,
    ) -> Result<Vec<PickupPointRow>, RepoError> {
        let tables = self.tables()?;
        let mut rows = Vec::new();
        let page = tables
            .pickup_points
            .iter()
            .skip(window.offset() as usize)
            .take(window.limit as usize);
        for point in page {
            let base = PickupPointRow {
                pvz_id: point.id,
                registration_date: point.registration_date,
                city: point.city.clone(),
                reception_id: None,
                reception_date: None,
                reception_status: None,
                reception_closed_at: None,
                product_id: None,
                product_date: None,
                product_type: None,
            };
            let receptions: Vec<&Reception> = tables
                .receptions
                .iter()
                .filter(|r| {
                    r.pvz_id == point.id
                        && r.date_time >= window.start_date
                        && r.date_time <= window.end_date
                })
                .collect();
            if receptions.is_empty() {
                rows.push(base);
                continue;
            }
            for reception in receptions {
                let with_reception = PickupPointRow {
                    reception_id: Some(reception.id),
                    reception_date: Some(reception.date_time),
                    reception_status: Some(reception.status),
                    reception_closed_at: reception.closed_at,
                    ..base.clone()
                };
                let products: Vec<&Product> = tables
                    .products
                    .iter()
                    .filter(|p| p.reception_id == reception.id)
                    .collect();
                if products.is_empty() {
                    rows.push(with_reception);
                    continue;
                }
                for product in products {
                    rows.push(PickupPointRow {
                        product_id: Some(product.id),
                        product_date: Some(product.date_time),
                        product_type: Some(product.product_type.clone()),
                        ..with_reception.clone()
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, RepoError> {
        Ok(self.tables()?.pickup_points.clone())
    }

    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError> {
        let mut tables = self.tables()?;
        if !tables.pickup_points.iter().any(|p| p.id == pvz_id) {
            return Err(RepoError::PickupPointNotFound);
        }
        if tables.open_reception_mut(pvz_id).is_some() {
            return Err(RepoError::ReceptionStillOpen);
        }
        let reception = Reception {
            id: Uuid::new_v4(),
            date_time: Utc::now(),
            pvz_id,
            status: ReceptionStatus::InProgress,
            closed_at: None,
        };
        tables.receptions.push(reception.clone());
        Ok(reception)
    }

    async fn close_reception(&self, pvz_id: Uuid) -> Result<Reception, RepoError> {
        let mut tables = self.tables()?;
        let reception = tables
            .open_reception_mut(pvz_id)
            .ok_or(RepoError::ReceptionAlreadyClosed)?;
        reception.status = ReceptionStatus::Closed;
        reception.closed_at = Some(Utc::now());
        Ok(reception.clone())
    }

    async fn add_product(
        &self,
        pvz_id: Uuid,
        product_type: &str,
    ) -> Result<Product, RepoError> {
        let mut tables = self.tables()?;
        let reception_id = tables
            .open_reception_mut(pvz_id)
            .map(|r| r.id)
            .ok_or(RepoError::NoActiveReception)?;
        if !PRODUCT_TYPES.contains(&product_type) {
            return Err(RepoError::InvalidType);
        }
        let product = Product {
            id: Uuid::new_v4(),
            date_time: Utc::now(),
            product_type: product_type.to_string(),
            reception_id,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn delete_last_product(&self, pvz_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables()?;
        let reception_id = tables
            .open_reception_mut(pvz_id)
            .map(|r| r.id)
            .ok_or(RepoError::NoActiveReception)?;
        let last = tables
            .products
            .iter()
            .rposition(|p| p.reception_id == reception_id)
            .ok_or(RepoError::NoItems)?;
        tables.products.remove(last);
        Ok(())
    }
}
