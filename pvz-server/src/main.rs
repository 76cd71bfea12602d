//! pvz-server entry point
//!
//! Serves the REST API, the gRPC listing and the Prometheus `/metrics`
//! endpoint on separate ports until Ctrl-C or SIGTERM.

use pvz_server::error::BoxError;
use pvz_server::{AppState, Config, api, grpc, metrics};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_tracing(config.json_logs);

    tracing::info!(
        "Starting {} (env: {})",
        config.service_name,
        config.environment
    );

    let prometheus = metrics::install_recorder()?;
    let state = AppState::new(&config).await?;

    let service = state.service.clone();
    let app = api::create_router(state, config.request_timeout);
    let metrics_app = metrics::metrics_router(prometheus);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("HTTP listening on {http_addr}");

    let metrics_addr = format!("0.0.0.0:{}", config.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;
    tracing::info!("Metrics listening on {metrics_addr}");

    let grpc_addr = format!("0.0.0.0:{}", config.grpc_port);
    let grpc_listener = tokio::net::TcpListener::bind(&grpc_addr).await?;
    tracing::info!("gRPC listening on {grpc_addr}");

    let grpc_handle = tokio::spawn(async move {
        if let Err(e) = grpc::serve(grpc_listener, service, shutdown_signal()).await {
            tracing::error!("gRPC server error: {e}");
        }
    });

    let metrics_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!("Metrics server error: {e}");
        }
    });

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    grpc_handle.await?;
    metrics_handle.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pvz_server=info,tower_http=info".into());
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
