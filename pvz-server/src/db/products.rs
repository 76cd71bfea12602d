//! Product intake and LIFO removal

use shared::models::Product;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::{ConstraintKind, RepoError};
use super::receptions::find_open_for_update;

/// Add a product to the in-progress reception of a pickup point.
///
/// The reception is read under a shared row lock, so a concurrent close
/// waits for this insert to commit (and vice versa) while concurrent adds
/// do not block each other.
pub async fn add(pool: &PgPool, pvz_id: Uuid, product_type: &str) -> Result<Product, RepoError> {
    let mut tx = pool.begin().await?;

    let active: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM receptions
         WHERE pickup_point_id = $1 AND status = 'in_progress'
         FOR SHARE",
    )
    .bind(pvz_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((reception_id,)) = active else {
        tx.rollback().await?;
        return Err(RepoError::NoActiveReception);
    };

    let product = sqlx::query_as(
        "INSERT INTO products (reception_id, type)
         VALUES ($1, $2::product_type)
         RETURNING id, created_at AS date_time, type::text AS product_type, reception_id",
    )
    .bind(reception_id)
    .bind(product_type)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        RepoError::classify_with(e, |kind| {
            (kind == ConstraintKind::InvalidEnumValue).then_some(RepoError::InvalidType)
        })
    })?;

    tx.commit().await?;
    Ok(product)
}

/// Remove the most recently added product of the in-progress reception
pub async fn delete_last(pool: &PgPool, pvz_id: Uuid) -> Result<(), RepoError> {
    let mut tx = pool.begin().await?;

    let Some(reception) = find_open_for_update(&mut tx, pvz_id).await? else {
        tx.rollback().await?;
        return Err(RepoError::NoActiveReception);
    };

    let result = sqlx::query(
        "DELETE FROM products
         WHERE id = (
             SELECT id FROM products
             WHERE reception_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1
         )",
    )
    .bind(reception.id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(RepoError::NoItems);
    }

    tx.commit().await?;
    Ok(())
}
