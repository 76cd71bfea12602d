//! Pickup point (PVZ) model and the aggregate listing view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Product, Reception};

/// Pickup point entity
///
/// Created once, never updated. `city` is kept verbatim as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PickupPoint {
    pub id: Uuid,
    pub registration_date: DateTime<Utc>,
    pub city: String,
}

/// POST /pvz payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePickupPointRequest {
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
}

/// One reception with the products recorded during it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionWithProducts {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// GET /pvz entry: a pickup point with its receptions in the date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPointSummary {
    pub pvz: PickupPoint,
    pub receptions: Vec<ReceptionWithProducts>,
}
