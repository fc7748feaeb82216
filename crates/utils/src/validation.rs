//! Shape checks for incoming request bodies.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single problem found in a request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS, utoipa::ToSchema)]
pub struct BodyIssue {
    /// Key path to the offending value; empty when the body as a whole is broken.
    pub path: Vec<String>,
    pub message: String,
}

impl BodyIssue {
    pub fn at(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![key.into()],
            message: message.into(),
        }
    }

    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

/// Implemented by request bodies that carry rules serde alone can't express.
pub trait Validate {
    /// Returns every rule violation; an empty vec means the body is acceptable.
    fn validate(&self) -> Vec<BodyIssue>;
}

/// Pushes an issue when `value` is empty.
pub fn require_non_empty(issues: &mut Vec<BodyIssue>, key: &str, value: &str, message: &str) {
    if value.is_empty() {
        issues.push(BodyIssue::at(key, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "value", "x", "value is required");
        assert!(issues.is_empty());

        require_non_empty(&mut issues, "value", "", "value is required");
        assert_eq!(issues, vec![BodyIssue::at("value", "value is required")]);
    }

    #[test]
    fn test_whitespace_counts_as_content() {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "name", " ", "name is required");
        assert!(issues.is_empty());
    }
}
