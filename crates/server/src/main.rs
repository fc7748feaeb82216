use anyhow::Context;
use deployment::Deployment;
use server::{DeploymentImpl, routes};
use services::services::database_validator::DatabaseValidator;
use tracing::{error, info, warn};
use utils::{config::AppConfig, logging::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first so RUST_LOG from .env reaches the subscriber
    let config = AppConfig::from_env()?;
    init_tracing();

    let deployment = DeploymentImpl::from_config(config).await?;

    let validation = DatabaseValidator::new(deployment.db().pool.clone())
        .validate()
        .await?;
    if validation.is_ok() {
        info!("{}", validation.summary());
    } else {
        warn!("{}", validation.summary());
    }

    let addr = deployment.config().bind_address();
    let app = routes::router(deployment);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
