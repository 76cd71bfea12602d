//! Reception lifecycle
//!
//! Both mutations run inside a transaction that holds a row lock for its
//! whole duration. A `Transaction` dropped without `commit` is rolled back,
//! which also covers a request future cancelled mid-flight.

use shared::models::Reception;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::error::{ConstraintKind, RepoError};

const RECEPTION_COLUMNS: &str =
    "id, created_at AS date_time, pickup_point_id AS pvz_id, status, closed_at";

/// Lock the in-progress reception of a pickup point, if there is one
pub(crate) async fn find_open_for_update(
    conn: &mut PgConnection,
    pvz_id: Uuid,
) -> Result<Option<Reception>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {RECEPTION_COLUMNS}
         FROM receptions
         WHERE pickup_point_id = $1 AND status = 'in_progress'
         FOR UPDATE"
    ))
    .bind(pvz_id)
    .fetch_optional(conn)
    .await
}

/// Open a new reception.
///
/// The pickup point row is locked first, which serializes concurrent opens
/// for the same pickup point. The partial unique index on in-progress
/// receptions backs this up at the schema level.
pub async fn open(pool: &PgPool, pvz_id: Uuid) -> Result<Reception, RepoError> {
    let mut tx = pool.begin().await?;

    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM pickup_points WHERE id = $1 FOR UPDATE")
            .bind(pvz_id)
            .fetch_optional(&mut *tx)
            .await?;
    if locked.is_none() {
        tx.rollback().await?;
        return Err(RepoError::PickupPointNotFound);
    }

    if find_open_for_update(&mut tx, pvz_id).await?.is_some() {
        tx.rollback().await?;
        return Err(RepoError::ReceptionStillOpen);
    }

    let reception = sqlx::query_as(&format!(
        "INSERT INTO receptions (pickup_point_id, status)
         VALUES ($1, 'in_progress')
         RETURNING {RECEPTION_COLUMNS}"
    ))
    .bind(pvz_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        RepoError::classify_with(e, |kind| match kind {
            ConstraintKind::UniqueViolation => Some(RepoError::ReceptionStillOpen),
            ConstraintKind::ForeignKeyViolation => Some(RepoError::PickupPointNotFound),
            _ => None,
        })
    })?;

    tx.commit().await?;
    Ok(reception)
}

/// Close the in-progress reception of a pickup point.
///
/// Runs under REPEATABLE READ. A concurrent close that wins the row lock
/// makes the loser fail with a serialization error, reported as already
/// closed.
pub async fn close(pool: &PgPool, pvz_id: Uuid) -> Result<Reception, RepoError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let already_closed = |e: sqlx::Error| {
        RepoError::classify_with(e, |kind| {
            (kind == ConstraintKind::SerializationFailure)
                .then_some(RepoError::ReceptionAlreadyClosed)
        })
    };

    let Some(open) = find_open_for_update(&mut tx, pvz_id)
        .await
        .map_err(already_closed)?
    else {
        tx.rollback().await?;
        return Err(RepoError::ReceptionAlreadyClosed);
    };

    let closed = sqlx::query_as(&format!(
        "UPDATE receptions
         SET status = 'closed', closed_at = now()
         WHERE id = $1
         RETURNING {RECEPTION_COLUMNS}"
    ))
    .bind(open.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(closed)
}
