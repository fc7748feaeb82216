use axum::{Router, extract::State, http::StatusCode, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::database_validator::DatabaseValidator;
use ts_rs::TS;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_tables: Vec<String>,
}

/// GET /health
/// 503 when the schema is not fully migrated
#[utoipa::path(get, path = "/health", tag = "System",
    responses(
        (status = 200, description = "Schema up to date", body = HealthStatus),
        (status = 503, description = "Schema incomplete", body = HealthStatus)
    ))]
pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> Result<(StatusCode, ResponseJson<HealthStatus>), ApiError> {
    let result = DatabaseValidator::new(deployment.db().pool.clone())
        .validate()
        .await?;

    let status_code = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let status = HealthStatus {
        status: if result.is_ok() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        migrations_applied: result.migrations_applied,
        latest_migration: result.latest_migration,
        missing_tables: result.missing_tables,
    };

    Ok((status_code, ResponseJson(status)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
