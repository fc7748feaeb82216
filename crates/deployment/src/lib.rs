use async_trait::async_trait;
use db::DBService;
use thiserror::Error;
use utils::config::AppConfig;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Everything a route handler may reach for while serving a request
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Opens the configured database and applies pending migrations
    async fn from_config(config: AppConfig) -> Result<Self, DeploymentError>;

    fn db(&self) -> &DBService;

    fn config(&self) -> &AppConfig;
}
