//! REST API routes

pub mod auth;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod product;
pub mod pvz;
pub mod reception;

use std::any::Any;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use shared::error::{AppError, ErrorCode};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::BoxError;
use crate::metrics::track_metrics;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the REST router
///
/// Requests running past `timeout` get 408 with [`ErrorCode::TimeoutError`];
/// their in-flight storage work is dropped, which rolls back any open
/// transaction.
pub fn create_router(state: AppState, timeout: Duration) -> Router {
    with_service_layers(routes(), timeout).with_state(state)
}

fn routes() -> Router<AppState> {
    let auth = Router::new()
        .route("/dummyLogin", post(auth::dummy_login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let pvz = Router::new()
        .route("/pvz", get(pvz::list_pickup_points).post(pvz::create_pickup_point))
        .route("/pvz/list", get(pvz::list_all_pickup_points))
        .route(
            "/pvz/{pvz_id}/close_last_reception",
            post(pvz::close_last_reception),
        )
        .route(
            "/pvz/{pvz_id}/delete_last_product",
            post(pvz::delete_last_product),
        )
        .route("/receptions", post(reception::create_reception))
        .route("/products", post(product::add_product));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth)
        .merge(pvz)
}

/// Cross-cutting layers applied to every route
fn with_service_layers(router: Router<AppState>, timeout: Duration) -> Router<AppState> {
    router
        .route_layer(axum_middleware::from_fn(track_metrics))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(timeout))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

async fn handle_timeout(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::new(ErrorCode::TimeoutError)
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        AppError::new(ErrorCode::InternalError)
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Request handler panicked");
    AppError::new(ErrorCode::InternalError).into_response()
}
