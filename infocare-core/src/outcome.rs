use serde::{Deserialize, Serialize};

use crate::association::AssociationView;
use crate::error::{ErrorKind, FieldIssue, InfoCareError};

/// Error body returned to API clients.
///
/// Carries a stable `kind` and a human-readable `message`; never internal detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub status: String,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<FieldIssue>,
    /// Set when a transition committed but a follow-up step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association: Option<AssociationView>,
}

impl Outcome {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            kind,
            message: message.into(),
            errors: Vec::new(),
            association: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn storage_error() -> Self {
        Self::new(
            ErrorKind::InternalStore,
            "An unexpected storage error occurred.",
        )
    }

    pub fn with_issues(mut self, issues: Vec<FieldIssue>) -> Self {
        self.errors = issues;
        self
    }
}

impl From<&InfoCareError> for Outcome {
    fn from(err: &InfoCareError) -> Self {
        match err {
            InfoCareError::Validation { message, issues } => {
                Outcome::validation(message.clone()).with_issues(issues.clone())
            }
            // Storage detail stays in the logs
            InfoCareError::Storage(_) => Outcome::storage_error(),
            InfoCareError::NotificationFailure { message, committed } => {
                let mut outcome = Outcome::new(ErrorKind::NotificationFailure, message.clone());
                outcome.association = committed.as_deref().cloned();
                outcome
            }
            other => Outcome::new(other.kind(), other.to_string()),
        }
    }
}

/// Plain success acknowledgement for deletions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: String,
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::new(ErrorKind::Forbidden, "Access denied");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "forbidden");
        assert_eq!(json["message"], "Access denied");
        assert!(json.get("errors").is_none());
        assert!(json.get("association").is_none());
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err = InfoCareError::Storage("disk I/O error at page 7".to_string());
        let outcome = Outcome::from(&err);
        assert_eq!(outcome.kind, ErrorKind::InternalStore);
        assert!(!outcome.message.contains("page 7"));
    }

    #[test]
    fn test_validation_issues_are_listed() {
        let err = InfoCareError::invalid_fields(vec![FieldIssue::new("cpf", "must be 14 characters")]);
        let json = serde_json::to_value(Outcome::from(&err)).unwrap();
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["errors"][0]["field"], "cpf");
    }
}
