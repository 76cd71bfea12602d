//! Application state

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::auth::{AuthService, Credentials};
use crate::config::Config;
use crate::db::PgStore;
use crate::error::BoxError;
use crate::metrics::ServiceMetrics;
use crate::service::PvzService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PvzService>,
    /// Token verification for the request principal
    pub credentials: Arc<dyn Credentials>,
    pub service_name: String,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and wire up the service.
    ///
    /// The metrics recorder must already be installed.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let credentials: Arc<dyn Credentials> = Arc::new(AuthService::new(
            &config.jwt_secret,
            config.service_name.clone(),
            config.jwt_expiry,
        ));
        let store = Arc::new(PgStore::new(pool));

        Ok(Self::from_parts(
            store,
            credentials,
            ServiceMetrics::register(),
            config.service_name.clone(),
        ))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        store: Arc<dyn crate::db::PvzStore>,
        credentials: Arc<dyn Credentials>,
        metrics: ServiceMetrics,
        service_name: String,
    ) -> Self {
        let service = Arc::new(PvzService::new(store, credentials.clone(), metrics));
        Self {
            service,
            credentials,
            service_name,
        }
    }
}
