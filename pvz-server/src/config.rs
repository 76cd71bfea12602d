//! Server configuration

use std::time::Duration;

use crate::error::BoxError;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// REST listener port
    pub http_port: u16,
    /// Prometheus `/metrics` listener port
    pub metrics_port: u16,
    /// gRPC listing listener port
    pub grpc_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Reported by `/health` and used as token issuer
    pub service_name: String,
    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_expiry: chrono::Duration,
    pub db_max_connections: u32,
    /// Per-request deadline
    pub request_timeout: Duration,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .ok_or("DATABASE_URL must be set")?,
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9000)?,
            grpc_port: parse_or(&lookup, "GRPC_PORT", 50051)?,
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "pvz-server".into()),
            jwt_secret: require_secret(&lookup, "JWT_SECRET", &environment)?,
            jwt_expiry: token_lifetime(parse_or(&lookup, "JWT_EXPIRY_HOURS", 2)?)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 15)?),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            environment,
        })
    }
}

fn token_lifetime(hours: i64) -> Result<chrono::Duration, BoxError> {
    chrono::Duration::try_hours(hours)
        .filter(|ttl| *ttl > chrono::Duration::zero())
        .ok_or_else(|| format!("JWT_EXPIRY_HOURS out of range: {hours}").into())
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
        None => Ok(default),
    }
}

/// Require a secret: must be set and non-empty outside development.
fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}
