//! POST /products

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shared::error::AppError;
use shared::models::{AddProductRequest, Product};

use super::extract::ValidatedJson;
use crate::auth::RequireEmployee;
use crate::service::require_id;
use crate::state::AppState;

pub async fn add_product(
    State(state): State<AppState>,
    RequireEmployee(_principal): RequireEmployee,
    ValidatedJson(req): ValidatedJson<AddProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let pvz_id = require_id(req.pvz_id, "pvzId")?;
    let product = state
        .service
        .add_product(pvz_id, &req.product_type)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}
