//! Routes for fills (values submitted against fields).

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{post, put},
};
use axum_extra::extract::WithRejection;
use db::models::fill::{CreateFill, Fill, FillWithField, UpdateFill};
use deployment::Deployment;
use services::services::fill::FillService;
use uuid::Uuid;

use utils::response::ErrorResponse;

use crate::{DeploymentImpl, error::ApiError, extract::ValidatedJson};

/// POST /preenchimentos
#[utoipa::path(post, path = "/preenchimentos", tag = "Fills",
    request_body = CreateFill,
    responses(
        (status = 201, description = "Created", body = Fill),
        (status = 400, description = "Invalid body or value", body = ErrorResponse),
        (status = 404, description = "Field not found", body = ErrorResponse),
        (status = 409, description = "Field changed while saving", body = ErrorResponse)
    ))]
pub async fn create_fill(
    State(deployment): State<DeploymentImpl>,
    ValidatedJson(payload): ValidatedJson<CreateFill>,
) -> Result<(StatusCode, ResponseJson<Fill>), ApiError> {
    let fill = FillService::create(&deployment.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(fill)))
}

/// GET /preenchimentos
#[utoipa::path(get, path = "/preenchimentos", tag = "Fills",
    responses((status = 200, description = "Success", body = Vec<FillWithField>)))]
pub async fn get_fills(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<FillWithField>>, ApiError> {
    let fills = FillService::list(&deployment.db().pool).await?;
    Ok(ResponseJson(fills))
}

/// PUT /preenchimentos/{fill_id}
#[utoipa::path(put, path = "/preenchimentos/{fill_id}", tag = "Fills",
    params(("fill_id" = Uuid, Path, description = "Fill ID")),
    request_body = UpdateFill,
    responses(
        (status = 200, description = "Success", body = Fill),
        (status = 400, description = "Invalid body or value", body = ErrorResponse),
        (status = 404, description = "Fill not found", body = ErrorResponse)
    ))]
pub async fn update_fill(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(fill_id), _): WithRejection<Path<Uuid>, ApiError>,
    ValidatedJson(payload): ValidatedJson<UpdateFill>,
) -> Result<ResponseJson<Fill>, ApiError> {
    let fill = FillService::update(&deployment.db().pool, fill_id, payload).await?;
    Ok(ResponseJson(fill))
}

/// DELETE /preenchimentos/{fill_id}
#[utoipa::path(delete, path = "/preenchimentos/{fill_id}", tag = "Fills",
    params(("fill_id" = Uuid, Path, description = "Fill ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Fill not found", body = ErrorResponse)
    ))]
pub async fn delete_fill(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(fill_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    FillService::delete(&deployment.db().pool, fill_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/preenchimentos", post(create_fill).get(get_fills))
        .route(
            "/preenchimentos/{fill_id}",
            put(update_fill).delete(delete_fill),
        )
}
