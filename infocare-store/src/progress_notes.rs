use crate::error::{Result, StoreError};
use crate::sqlite_store::SqliteStore;
use infocare_core::{AdmissionStatus, ProgressNote};
use rusqlite::params;

#[allow(clippy::result_large_err)]
impl SqliteStore {
    /// Record a note against an ACTIVE admission.
    ///
    /// The status read and the insert share one transaction, so a discharge
    /// racing this call either lands before (note refused) or after (note kept).
    pub fn create_progress_note(
        &self,
        admission_id: i64,
        professional_id: i64,
        description: &str,
    ) -> Result<ProgressNote> {
        let note = self.in_transaction(|ops| {
            match ops.admission_status(admission_id)? {
                None => Err(StoreError::NotFound { entity: "Admission", id: admission_id }),
                Some(AdmissionStatus::Discharged) => Err(StoreError::Blocked(
                    "Cannot add a progress note to a discharged admission.".to_string(),
                )),
                Some(AdmissionStatus::Active) => {
                    ops.insert_progress_note(admission_id, professional_id, description.trim())
                }
            }
        })?;
        tracing::debug!(note_id = note.id, admission_id, professional_id, "Progress note stored");
        Ok(note)
    }

    pub fn delete_progress_note(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM progress_notes WHERE id = ?", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound { entity: "Progress note", id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admission, professional};

    #[test]
    fn test_note_on_active_admission() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        let adm = admission(&store, 1, None);

        let note = store.create_progress_note(adm.id, nurse.id, "  Stable overnight ").unwrap();
        assert_eq!(note.admission_id, adm.id);
        assert_eq!(note.professional_id, nurse.id);
        assert_eq!(note.description, "Stable overnight");
    }

    #[test]
    fn test_note_on_discharged_admission_is_blocked() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        let adm = admission(&store, 1, None);
        store.discharge_admission(adm.id).unwrap();

        let err = store.create_progress_note(adm.id, nurse.id, "Too late").unwrap_err();
        assert!(matches!(err, StoreError::Blocked(_)));

        let detail = store.admission_detail(adm.id).unwrap().unwrap();
        assert!(detail.progress_notes.is_empty());
    }

    #[test]
    fn test_note_on_missing_admission() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        assert!(matches!(
            store.create_progress_note(42, nurse.id, "Nobody here").unwrap_err(),
            StoreError::NotFound { entity: "Admission", id: 42 }
        ));
    }

    #[test]
    fn test_delete_note() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        let adm = admission(&store, 1, None);
        let note = store.create_progress_note(adm.id, nurse.id, "Stable overnight").unwrap();

        store.delete_progress_note(note.id).unwrap();
        assert!(matches!(
            store.delete_progress_note(note.id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
