//! POST /dummyLogin, /register, /login

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shared::error::AppError;
use shared::models::{DummyLoginRequest, LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};

use super::ApiResult;
use super::extract::ValidatedJson;
use crate::state::AppState;

/// POST /dummyLogin
pub async fn dummy_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<DummyLoginRequest>,
) -> ApiResult<TokenResponse> {
    let token = state.service.dummy_login(req.role).await?;
    Ok(Json(token))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = state.service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let token = state.service.login(req).await?;
    Ok(Json(token))
}
