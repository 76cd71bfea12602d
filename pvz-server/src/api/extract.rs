//! Request extractors that reject with the unified error body

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use shared::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::service::require_id;

/// JSON body that has been deserialized and validated
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// `{pvz_id}` path segment as a non-nil UUID
pub struct PvzId(pub Uuid);

impl<S> FromRequestParts<S> for PvzId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|_| AppError::validation(format!("invalid pickup point id: {raw}")))?;
        Ok(Self(require_id(id, "pvzId")?))
    }
}
