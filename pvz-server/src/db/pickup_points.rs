use shared::models::PickupPoint;
use sqlx::PgPool;

use super::error::{ConstraintKind, RepoError};
use crate::read_model::{ListingWindow, PickupPointRow};

/// Insert a pickup point. The city is cast to the `city` enum in SQL so
/// unsupported values are rejected by the database.
pub async fn create(pool: &PgPool, city: &str) -> Result<PickupPoint, RepoError> {
    sqlx::query_as(
        "INSERT INTO pickup_points (city)
         VALUES ($1::city)
         RETURNING id, created_at AS registration_date, city::text AS city",
    )
    .bind(city)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        RepoError::classify_with(e, |kind| {
            (kind == ConstraintKind::InvalidEnumValue).then_some(RepoError::InvalidCity)
        })
    })
}

/// Page over pickup points, then attach receptions created inside the
/// window and their products.
///
/// The window filter lives in the join condition so pickup points without
/// matching receptions still come back with NULL reception columns.
pub async fn list_page(
    pool: &PgPool,
    window: &ListingWindow,
) -> Result<Vec<PickupPointRow>, RepoError> {
    let rows = sqlx::query_as(
        "SELECT
             p.id AS pvz_id,
             p.created_at AS registration_date,
             p.city::text AS city,
             r.id AS reception_id,
             r.created_at AS reception_date,
             r.status AS reception_status,
             r.closed_at AS reception_closed_at,
             pr.id AS product_id,
             pr.created_at AS product_date,
             pr.type::text AS product_type
         FROM (
             SELECT id, city, created_at
             FROM pickup_points
             ORDER BY created_at, id
             LIMIT $3 OFFSET $4
         ) p
         LEFT JOIN receptions r
             ON r.pickup_point_id = p.id
            AND r.created_at BETWEEN $1 AND $2
         LEFT JOIN products pr ON pr.reception_id = r.id
         ORDER BY p.created_at, p.id, r.created_at, r.id, pr.created_at, pr.id",
    )
    .bind(window.start_date)
    .bind(window.end_date)
    .bind(window.limit)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<PickupPoint>, RepoError> {
    let points = sqlx::query_as(
        "SELECT id, created_at AS registration_date, city::text AS city
         FROM pickup_points
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(points)
}
