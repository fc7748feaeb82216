//! Routes for field definitions.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{post, put},
};
use axum_extra::extract::WithRejection;
use db::models::field::{CreateField, FieldWithFills, UpdateField};
use deployment::Deployment;
use services::services::field::FieldService;
use uuid::Uuid;

use utils::response::ErrorResponse;

use crate::{DeploymentImpl, error::ApiError, extract::ValidatedJson};

/// POST /campos
#[utoipa::path(post, path = "/campos", tag = "Fields",
    request_body = CreateField,
    responses(
        (status = 201, description = "Created", body = FieldWithFills),
        (status = 400, description = "Invalid body or duplicate name", body = ErrorResponse)
    ))]
pub async fn create_field(
    State(deployment): State<DeploymentImpl>,
    ValidatedJson(payload): ValidatedJson<CreateField>,
) -> Result<(StatusCode, ResponseJson<FieldWithFills>), ApiError> {
    let field = FieldService::create(&deployment.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(field)))
}

/// GET /campos
/// Fields in creation order, each with its fills
#[utoipa::path(get, path = "/campos", tag = "Fields",
    responses((status = 200, description = "Success", body = Vec<FieldWithFills>)))]
pub async fn get_fields(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<FieldWithFills>>, ApiError> {
    let fields = FieldService::list(&deployment.db().pool).await?;
    Ok(ResponseJson(fields))
}

/// PUT /campos/{field_id}
#[utoipa::path(put, path = "/campos/{field_id}", tag = "Fields",
    params(("field_id" = Uuid, Path, description = "Field ID")),
    request_body = UpdateField,
    responses(
        (status = 200, description = "Success", body = FieldWithFills),
        (status = 400, description = "Invalid body, duplicate name or locked datatype", body = ErrorResponse),
        (status = 404, description = "Field not found", body = ErrorResponse)
    ))]
pub async fn update_field(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(field_id), _): WithRejection<Path<Uuid>, ApiError>,
    ValidatedJson(payload): ValidatedJson<UpdateField>,
) -> Result<ResponseJson<FieldWithFills>, ApiError> {
    let field = FieldService::update(&deployment.db().pool, field_id, payload).await?;
    Ok(ResponseJson(field))
}

/// DELETE /campos/{field_id}
/// Fills of the field are deleted with it
#[utoipa::path(delete, path = "/campos/{field_id}", tag = "Fields",
    params(("field_id" = Uuid, Path, description = "Field ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Field not found", body = ErrorResponse)
    ))]
pub async fn delete_field(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(field_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    FieldService::delete(&deployment.db().pool, field_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/campos", post(create_field).get(get_fields))
        .route("/campos/{field_id}", put(update_field).delete(delete_field))
}
