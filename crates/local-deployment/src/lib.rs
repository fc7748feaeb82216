use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use tracing::info;
use utils::config::AppConfig;

#[derive(Clone)]
pub struct LocalDeployment {
    db: DBService,
    config: Arc<AppConfig>,
}

impl LocalDeployment {
    /// Deployment over a private in-memory database, for tests and tooling.
    pub async fn in_memory() -> Result<Self, DeploymentError> {
        Self::in_memory_with(AppConfig::default()).await
    }

    /// Like [`LocalDeployment::in_memory`], keeping `config` for everything
    /// except the database location.
    pub async fn in_memory_with(config: AppConfig) -> Result<Self, DeploymentError> {
        Ok(Self {
            db: DBService::new_in_memory().await?,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn from_config(config: AppConfig) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url, config.max_connections).await?;
        info!(
            bind = %config.bind_address(),
            cors_origins = config.cors_origins.len(),
            "Local deployment initialized"
        );
        Ok(Self {
            db,
            config: Arc::new(config),
        })
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.db");
        let config = AppConfig {
            database_url: format!("sqlite://{}", path.display()),
            ..AppConfig::default()
        };

        let deployment = LocalDeployment::from_config(config).await.unwrap();
        assert!(path.exists());

        let fields = db::models::field::Field::find_all(&deployment.db().pool)
            .await
            .unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_uses_defaults() {
        let deployment = LocalDeployment::in_memory().await.unwrap();
        assert_eq!(deployment.config(), &AppConfig::default());
    }

    #[tokio::test]
    async fn test_in_memory_with_keeps_config() {
        let config = AppConfig {
            cors_origins: vec!["https://a.example".to_string()],
            ..AppConfig::default()
        };
        let deployment = LocalDeployment::in_memory_with(config.clone()).await.unwrap();
        assert_eq!(deployment.config(), &config);
    }
}
