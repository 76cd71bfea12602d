//! Pickup point endpoints

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{CreatePickupPointRequest, PickupPoint, PickupPointSummary, Reception};

use super::ApiResult;
use super::extract::{PvzId, ValidatedJson};
use crate::auth::{RequireEmployee, RequireModerator, RequireStaff};
use crate::read_model::ListingWindow;
use crate::state::AppState;

/// Raw query of GET /pvz; unparsable values fall back to defaults
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListQuery {
    pub fn window(&self) -> ListingWindow {
        ListingWindow::new(
            parse_lenient(self.page.as_deref(), "page", |s| s.parse::<i64>().ok()),
            parse_lenient(self.limit.as_deref(), "limit", |s| s.parse::<i64>().ok()),
            parse_lenient(self.start_date.as_deref(), "startDate", parse_rfc3339),
            parse_lenient(self.end_date.as_deref(), "endDate", parse_rfc3339),
        )
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_lenient<T>(
    raw: Option<&str>,
    name: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::debug!(param = name, value = raw, "Ignoring unparsable query parameter");
    }
    parsed
}

/// GET /pvz
pub async fn list_pickup_points(
    State(state): State<AppState>,
    RequireStaff(_principal): RequireStaff,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<PickupPointSummary>> {
    let listing = state.service.list_pickup_points(query.window()).await?;
    Ok(Json(listing))
}

/// POST /pvz
pub async fn create_pickup_point(
    State(state): State<AppState>,
    RequireModerator(principal): RequireModerator,
    ValidatedJson(req): ValidatedJson<CreatePickupPointRequest>,
) -> Result<(StatusCode, Json<PickupPoint>), AppError> {
    tracing::debug!(user_id = %principal.user_id, "Create pickup point");
    let point = state.service.create_pickup_point(&req.city).await?;
    Ok((StatusCode::CREATED, Json(point)))
}

/// GET /pvz/list
pub async fn list_all_pickup_points(
    State(state): State<AppState>,
    RequireStaff(_principal): RequireStaff,
) -> ApiResult<Vec<PickupPoint>> {
    let points = state.service.list_all_pickup_points().await?;
    Ok(Json(points))
}

/// POST /pvz/{pvzId}/close_last_reception
pub async fn close_last_reception(
    State(state): State<AppState>,
    RequireEmployee(_principal): RequireEmployee,
    PvzId(pvz_id): PvzId,
) -> ApiResult<Reception> {
    let reception = state.service.close_reception(pvz_id).await?;
    Ok(Json(reception))
}

/// POST /pvz/{pvzId}/delete_last_product
pub async fn delete_last_product(
    State(state): State<AppState>,
    RequireEmployee(_principal): RequireEmployee,
    PvzId(pvz_id): PvzId,
) -> Result<StatusCode, AppError> {
    state.service.delete_last_product(pvz_id).await?;
    Ok(StatusCode::OK)
}
