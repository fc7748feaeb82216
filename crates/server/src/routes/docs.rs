//! OpenAPI document assembled from the handler annotations, served with Swagger UI.

use axum::Router;
use db::models::{
    field::{CreateField, DataType, Field, FieldWithFills, UpdateField},
    fill::{CreateFill, Fill, FillWithField, UpdateFill},
};
use utils::{response::ErrorResponse, validation::BodyIssue};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{fields, fills, health};
use crate::DeploymentImpl;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dynamic Fields API",
        description = "Typed custom fields and the values filled against them"
    ),
    paths(
        fields::create_field, fields::get_fields, fields::update_field, fields::delete_field,
        fills::create_fill, fills::get_fills, fills::update_fill, fills::delete_fill,
        health::health_check,
    ),
    components(schemas(
        DataType, Field, FieldWithFills, CreateField, UpdateField,
        Fill, FillWithField, CreateFill, UpdateFill,
        ErrorResponse, BodyIssue, health::HealthStatus,
    )),
    tags(
        (name = "Fields", description = "Field definitions"),
        (name = "Fills", description = "Values submitted against fields"),
        (name = "System", description = "Health and schema status")
    )
)]
pub struct ApiDoc;

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().merge(SwaggerUi::new("/docs").url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
}
