//! Application service
//!
//! Thin orchestration over [`PvzStore`] and [`Credentials`]: translates
//! storage outcomes into client-facing errors, drives the register/login
//! flow and bumps business counters after successful writes.

use std::sync::Arc;

use shared::models::{
    LoginRequest, PickupPoint, PickupPointSummary, Product, Reception, RegisterRequest,
    RegisterResponse, Role, TokenResponse,
};
use shared::{AppError, ErrorCode};
use uuid::Uuid;

use crate::auth::Credentials;
use crate::db::{PvzStore, RepoError};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::ServiceMetrics;
use crate::read_model::{ListingWindow, fold_rows};

pub struct PvzService {
    store: Arc<dyn PvzStore>,
    credentials: Arc<dyn Credentials>,
    metrics: ServiceMetrics,
}

impl PvzService {
    pub fn new(
        store: Arc<dyn PvzStore>,
        credentials: Arc<dyn Credentials>,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            store,
            credentials,
            metrics,
        }
    }

    // ========== Users ==========

    /// Token for a throwaway identity with the requested role
    #[tracing::instrument(skip(self))]
    pub async fn dummy_login(&self, role: Role) -> ServiceResult<TokenResponse> {
        let token = self.credentials.issue_token(Uuid::new_v4(), role)?;
        Ok(TokenResponse { token })
    }

    #[tracing::instrument(skip_all, fields(role = %req.role))]
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<RegisterResponse> {
        let email = normalize_email(&req.email);
        let credentials = self.credentials.clone();
        let password = req.password;
        let hash = tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| ServiceError::Db(e.into()))??;

        let id = match self.store.create_user(&email, &hash, req.role).await {
            Ok(id) => id,
            Err(RepoError::DuplicateEmail) => {
                tracing::debug!("Registration with an existing email");
                return Err(RepoError::DuplicateEmail.into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %id, "User registered");
        Ok(RegisterResponse {
            id,
            email,
            role: req.role,
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<TokenResponse> {
        let email = normalize_email(&req.email);
        let user = match self.store.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(RepoError::NotFound) => {
                tracing::debug!("Login for unknown email");
                return Err(AppError::invalid_credentials().into());
            }
            Err(e) => return Err(e.into()),
        };

        let credentials = self.credentials.clone();
        let password = req.password;
        let hash = user.password_hash;
        let valid =
            tokio::task::spawn_blocking(move || credentials.verify_password(&password, &hash))
                .await
                .map_err(|e| ServiceError::Db(e.into()))?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::invalid_credentials().into());
        }

        let token = self.credentials.issue_token(user.id, user.role)?;
        Ok(TokenResponse { token })
    }

    // ========== Pickup points ==========

    #[tracing::instrument(skip(self))]
    pub async fn create_pickup_point(&self, city: &str) -> ServiceResult<PickupPoint> {
        let point = self.store.create_pickup_point(city).await.map_err(|e| {
            if matches!(e, RepoError::InvalidCity) {
                tracing::debug!("Rejected city");
            }
            ServiceError::from(e)
        })?;
        self.metrics.pickup_points_created.increment(1);
        tracing::info!(pvz_id = %point.id, "Pickup point created");
        Ok(point)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_pickup_points(
        &self,
        window: ListingWindow,
    ) -> ServiceResult<Vec<PickupPointSummary>> {
        let rows = self.store.list_pickup_points_paged(&window).await?;
        Ok(fold_rows(rows))
    }

    pub async fn list_all_pickup_points(&self) -> ServiceResult<Vec<PickupPoint>> {
        Ok(self.store.list_all_pickup_points().await?)
    }

    // ========== Receptions ==========

    #[tracing::instrument(skip(self))]
    pub async fn open_reception(&self, pvz_id: Uuid) -> ServiceResult<Reception> {
        let reception = self
            .store
            .open_reception(pvz_id)
            .await
            .map_err(log_outcome)?;
        self.metrics.receptions_opened.increment(1);
        tracing::info!(reception_id = %reception.id, "Reception opened");
        Ok(reception)
    }

    #[tracing::instrument(skip(self))]
    pub async fn close_reception(&self, pvz_id: Uuid) -> ServiceResult<Reception> {
        let reception = self
            .store
            .close_reception(pvz_id)
            .await
            .map_err(log_outcome)?;
        tracing::info!(reception_id = %reception.id, "Reception closed");
        Ok(reception)
    }

    // ========== Products ==========

    #[tracing::instrument(skip(self))]
    pub async fn add_product(&self, pvz_id: Uuid, product_type: &str) -> ServiceResult<Product> {
        let product = self
            .store
            .add_product(pvz_id, product_type)
            .await
            .map_err(log_outcome)?;
        self.metrics.products_added.increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_last_product(&self, pvz_id: Uuid) -> ServiceResult<()> {
        self.store
            .delete_last_product(pvz_id)
            .await
            .map_err(log_outcome)?;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Typed storage outcomes are expected traffic; opaque ones are logged when
/// converted to `AppError`.
fn log_outcome(e: RepoError) -> ServiceError {
    if !matches!(e, RepoError::Db(_)) {
        tracing::debug!(outcome = %e, "Request rejected by storage");
    }
    e.into()
}

/// Nil ids never name a stored row
pub fn require_id(id: Uuid, field: &str) -> Result<Uuid, AppError> {
    if id.is_nil() {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!("{field} must not be empty"),
        ));
    }
    Ok(id)
}
