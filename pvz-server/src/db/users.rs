use shared::models::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::{ConstraintKind, RepoError};

pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<Uuid, RepoError> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, role)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        RepoError::classify_with(e, |kind| {
            (kind == ConstraintKind::UniqueViolation).then_some(RepoError::DuplicateEmail)
        })
    })?;
    Ok(id)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<User, RepoError> {
    sqlx::query_as("SELECT id, email, password_hash, role FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(RepoError::NotFound)
}
