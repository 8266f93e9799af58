use infocare_core::{AssociationStatus, InfoCareError};
use rusqlite::ffi;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// A UNIQUE constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A FOREIGN KEY constraint rejected the write
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The (family member, admission) pair already has an association
    #[error("Association already exists with status {0}")]
    AlreadyRequested(AssociationStatus),

    /// The entity's current state forbids the write
    #[error("{0}")]
    Blocked(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::UniqueViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::ForeignKeyViolation(detail);
                }
                _ => {}
            }
        }
        StoreError::Sqlite(err)
    }
}

impl From<StoreError> for InfoCareError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => InfoCareError::not_found(entity, id),
            StoreError::UniqueViolation(detail) => InfoCareError::Duplicate(format!(
                "A record with this value already exists ({}).",
                unique_columns(&detail)
            )),
            StoreError::AlreadyRequested(status) => InfoCareError::duplicate_request(status),
            StoreError::Blocked(message) => InfoCareError::BlockedAction(message),
            StoreError::ForeignKeyViolation(_) => {
                InfoCareError::NotFound("A referenced record was not found.".to_string())
            }
            other => InfoCareError::Storage(other.to_string()),
        }
    }
}

/// Column list from a SQLite "UNIQUE constraint failed: t.a, t.b" message
fn unique_columns(detail: &str) -> String {
    detail
        .rsplit_once(": ")
        .map(|(_, cols)| {
            cols.split(", ")
                .map(|c| c.rsplit('.').next().unwrap_or(c))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| detail.to_string())
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use infocare_core::ErrorKind;

    #[test]
    fn test_unique_columns() {
        assert_eq!(
            unique_columns("UNIQUE constraint failed: family_members.email"),
            "email"
        );
        assert_eq!(
            unique_columns("UNIQUE constraint failed: associations.family_member_id, associations.admission_id"),
            "family_member_id, admission_id"
        );
    }

    #[test]
    fn test_error_kind_mapping() {
        let err: InfoCareError = StoreError::UniqueViolation("UNIQUE constraint failed: patients.cpf".into()).into();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert!(err.to_string().contains("cpf"));

        let err: InfoCareError = StoreError::NotFound { entity: "Admission", id: 3 }.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: InfoCareError = StoreError::AlreadyRequested(AssociationStatus::Pending).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("pendente"));

        let err: InfoCareError = StoreError::Blocked("discharged".into()).into();
        assert_eq!(err.kind(), ErrorKind::BlockedAction);

        let err: InfoCareError = StoreError::Other("boom".into()).into();
        assert_eq!(err.kind(), ErrorKind::InternalStore);
    }
}
