use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    database_validator::DatabaseValidationError, field::FieldError, fill::FillError,
};
use thiserror::Error;
use utils::{response::ErrorResponse, validation::BodyIssue};

pub const INVALID_BODY_MESSAGE: &str = "Request body validation failed";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error("Request body validation failed")]
    InvalidBody(Vec<BodyIssue>),
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(vec![BodyIssue::root(rejection.body_text())])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Field(FieldError::NotFound)
            | ApiError::Fill(FillError::NotFound | FillError::FieldNotFound) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Field(FieldError::NameTaken | FieldError::DatatypeLocked)
            | ApiError::Fill(FillError::InvalidValue(_))
            | ApiError::InvalidBody(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Fill(FillError::FieldChanged) => StatusCode::CONFLICT,
            ApiError::Field(FieldError::Database(_))
            | ApiError::Fill(FillError::Database(_))
            | ApiError::DatabaseValidation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match self {
            ApiError::InvalidBody(issues) => ErrorResponse::with_issues(INVALID_BODY_MESSAGE, issues),
            other if status_code.is_server_error() => {
                tracing::error!(error = %other, "Request failed");
                ErrorResponse::message(INTERNAL_ERROR_MESSAGE)
            }
            other => ErrorResponse::message(other.to_string()),
        };

        (status_code, ResponseJson(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use services::services::value::ValueError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(FieldError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(FillError::FieldNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(FieldError::DatatypeLocked).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FillError::InvalidValue(ValueError::InvalidDate)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FillError::FieldChanged).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(FieldError::Database(sqlx::Error::PoolTimedOut)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(
            ApiError::from(FieldError::NameTaken).to_string(),
            "This name already exists"
        );
        assert_eq!(
            ApiError::from(FillError::InvalidValue(ValueError::NotNumeric)).to_string(),
            "Value must be numeric."
        );
    }
}
