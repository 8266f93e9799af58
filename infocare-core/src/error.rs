use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::association::{AssociationStatus, AssociationView};

/// Machine-readable error category carried on every failure.
///
/// The HTTP boundary maps each kind to exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    UnknownPrincipal,
    Forbidden,
    NotFound,
    Conflict,
    Duplicate,
    BlockedAction,
    NotificationFailure,
    InternalStore,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::UnknownPrincipal => "unknown_principal",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::BlockedAction => "blocked_action",
            ErrorKind::NotificationFailure => "notification_failure",
            ErrorKind::InternalStore => "internal_store",
        }
    }
}

/// A single field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum InfoCareError {
    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<FieldIssue>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Unknown principal kind: {0}")]
    UnknownPrincipal(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// A second access request for the same (family member, admission) pair.
    #[error("{message}")]
    Conflict {
        message: String,
        existing_status: Option<AssociationStatus>,
    },

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    BlockedAction(String),

    /// The state transition was committed but its notification could not be delivered.
    #[error("{message}")]
    NotificationFailure {
        message: String,
        committed: Option<Box<AssociationView>>,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl InfoCareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InfoCareError::Validation { .. } => ErrorKind::Validation,
            InfoCareError::Unauthorized(_) => ErrorKind::Unauthorized,
            InfoCareError::UnknownPrincipal(_) => ErrorKind::UnknownPrincipal,
            InfoCareError::Forbidden(_) => ErrorKind::Forbidden,
            InfoCareError::NotFound(_) => ErrorKind::NotFound,
            InfoCareError::Conflict { .. } => ErrorKind::Conflict,
            InfoCareError::Duplicate(_) => ErrorKind::Duplicate,
            InfoCareError::BlockedAction(_) => ErrorKind::BlockedAction,
            InfoCareError::NotificationFailure { .. } => ErrorKind::NotificationFailure,
            InfoCareError::Storage(_) => ErrorKind::InternalStore,
        }
    }

    /// Validation failure without field detail
    pub fn validation(message: impl Into<String>) -> Self {
        InfoCareError::Validation {
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn invalid_fields(issues: Vec<FieldIssue>) -> Self {
        InfoCareError::Validation {
            message: "Validation failed for the submitted data.".to_string(),
            issues,
        }
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        InfoCareError::NotFound(format!("{} not found: {}", entity, id))
    }

    pub fn duplicate_request(existing: AssociationStatus) -> Self {
        InfoCareError::Conflict {
            message: format!(
                "A request for this admission has already been submitted (status: {}).",
                existing.as_str()
            ),
            existing_status: Some(existing),
        }
    }
}

pub type Result<T> = std::result::Result<T, InfoCareError>;
