//! Velero Dashboard API
//!
//! Main entry point. Loads settings, connects to the Kubernetes API server
//! and serves the HTTP API until a shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use velero_dashboard_api::{
    adapters::{self, AwsConnector, KubeVeleroClient},
    api::{self, AppState},
    config::{LogFormat, Settings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();

    init_tracing(&settings);

    info!(
        cluster = %settings.cluster_name,
        namespace = %settings.velero_namespace,
        "Starting Velero Dashboard API"
    );

    let client = adapters::connect(settings.kubeconfig_path.as_deref()).await?;
    info!("Connected to Kubernetes API server");

    let velero = KubeVeleroClient::new(client, settings.velero_namespace.clone());
    let addr = settings.listen_addr();
    let state = AppState::new(Arc::new(velero), Arc::new(AwsConnector), settings);
    let app = api::router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Velero Dashboard API stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(settings: &Settings) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));

    let registry = tracing_subscriber::registry().with(env_filter);
    match settings.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
