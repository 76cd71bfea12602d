//! POST /receptions

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shared::error::AppError;
use shared::models::{CreateReceptionRequest, Reception};

use super::extract::ValidatedJson;
use crate::auth::RequireEmployee;
use crate::service::require_id;
use crate::state::AppState;

pub async fn create_reception(
    State(state): State<AppState>,
    RequireEmployee(principal): RequireEmployee,
    ValidatedJson(req): ValidatedJson<CreateReceptionRequest>,
) -> Result<(StatusCode, Json<Reception>), AppError> {
    let pvz_id = require_id(req.pvz_id, "pvzId")?;
    tracing::debug!(user_id = %principal.user_id, %pvz_id, "Open reception");
    let reception = state.service.open_reception(pvz_id).await?;
    Ok((StatusCode::CREATED, Json(reception)))
}
