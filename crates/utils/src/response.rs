use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::BodyIssue;

/// Body returned by every failed request.
///
/// `errors` is only present when the request body itself was rejected, so
/// clients can point at the offending key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub errors: Option<Vec<BodyIssue>>,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_issues(message: impl Into<String>, issues: Vec<BodyIssue>) -> Self {
        Self {
            message: message.into(),
            errors: Some(issues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_omits_errors() {
        let json = serde_json::to_value(ErrorResponse::message("Field not found")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Field not found" }));
    }

    #[test]
    fn test_issues_are_serialized() {
        let body = ErrorResponse::with_issues(
            "Request body validation failed",
            vec![BodyIssue::at("name", "name is required")],
        );
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["errors"][0]["path"], serde_json::json!(["name"]));
        assert_eq!(json["errors"][0]["message"], "name is required");
    }
}
