use crate::error::{Result, StoreError};
use crate::rows::{self, ASSOCIATION_COLUMNS, ASSOCIATION_WIDTH};
use crate::sqlite_store::SqliteStore;
use chrono::Utc;
use infocare_core::{Association, AssociationStatus, AssociationView};
use rusqlite::{params, OptionalExtension, Row};

fn view_query(tail: &str) -> String {
    format!(
        "SELECT {}, p.name, f.name, f.email, a.status
         FROM associations s
         JOIN family_members f ON f.id = s.family_member_id
         JOIN admissions a ON a.id = s.admission_id
         JOIN patients p ON p.id = a.patient_id
         {}",
        ASSOCIATION_COLUMNS, tail
    )
}

fn view(row: &Row) -> rusqlite::Result<AssociationView> {
    Ok(AssociationView {
        association: rows::association(row, 0)?,
        patient_name: row.get(ASSOCIATION_WIDTH)?,
        family_member_name: row.get(ASSOCIATION_WIDTH + 1)?,
        family_member_email: row.get(ASSOCIATION_WIDTH + 2)?,
        admission_status: rows::admission_status(row, ASSOCIATION_WIDTH + 3)?,
    })
}

#[allow(clippy::result_large_err)]
impl SqliteStore {
    /// Insert a PENDING association.
    ///
    /// The UNIQUE(family_member_id, admission_id) constraint decides duplicates;
    /// the loser of a concurrent double-submit gets `AlreadyRequested` too.
    pub fn insert_association(&self, family_member_id: i64, admission_id: i64) -> Result<Association> {
        let conn = self.conn()?;
        let admission: Option<i64> = conn
            .query_row("SELECT id FROM admissions WHERE id = ?", params![admission_id], |row| {
                row.get(0)
            })
            .optional()?;
        if admission.is_none() {
            return Err(StoreError::NotFound { entity: "Admission", id: admission_id });
        }

        let requested_at = Utc::now();
        let inserted = conn.execute(
            "INSERT INTO associations (family_member_id, admission_id, status, requested_at)
             VALUES (?, ?, ?, ?)",
            params![
                family_member_id,
                admission_id,
                AssociationStatus::Pending.as_str(),
                requested_at
            ],
        );

        match inserted.map_err(StoreError::from) {
            Ok(_) => Ok(Association {
                id: conn.last_insert_rowid(),
                family_member_id,
                admission_id,
                status: AssociationStatus::Pending,
                requested_at,
            }),
            Err(StoreError::UniqueViolation(_)) => {
                let existing: String = conn.query_row(
                    "SELECT status FROM associations WHERE family_member_id = ? AND admission_id = ?",
                    params![family_member_id, admission_id],
                    |row| row.get(0),
                )?;
                let status = AssociationStatus::parse(&existing)
                    .map_err(|_| StoreError::Corrupt(format!("association status '{}'", existing)))?;
                Err(StoreError::AlreadyRequested(status))
            }
            Err(StoreError::ForeignKeyViolation(_)) => Err(StoreError::NotFound {
                entity: "Family member",
                id: family_member_id,
            }),
            Err(other) => Err(other),
        }
    }

    /// The association linking one family member to one admission, if any
    pub fn find_association(&self, family_member_id: i64, admission_id: i64) -> Result<Option<Association>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM associations s WHERE s.family_member_id = ? AND s.admission_id = ?",
            ASSOCIATION_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![family_member_id, admission_id], |row| {
                rows::association(row, 0)
            })
            .optional()?)
    }

    /// Association with family member and patient names resolved
    pub fn association_view(&self, id: i64) -> Result<Option<AssociationView>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(&view_query("WHERE s.id = ?"), params![id], view)
            .optional()?)
    }

    /// Overwrite the status and return the one it replaced
    pub fn set_association_status(&self, id: i64, status: AssociationStatus) -> Result<AssociationStatus> {
        self.in_transaction(|ops| {
            let previous = ops
                .association_status(id)?
                .ok_or(StoreError::NotFound { entity: "Association", id })?;
            ops.set_association_status(id, status)?;
            Ok(previous)
        })
    }

    pub fn delete_association(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM associations WHERE id = ?", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound { entity: "Association", id });
        }
        Ok(())
    }

    /// Review queue: oldest request first
    pub fn list_associations(&self, status: Option<AssociationStatus>) -> Result<Vec<AssociationView>> {
        let conn = self.conn()?;
        let sql = view_query(
            "WHERE (?1 IS NULL OR s.status = ?1)
             ORDER BY s.requested_at ASC, s.id ASC",
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![status.map(|s| s.as_str())], view)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    /// One family member's requests, newest first
    pub fn list_associations_for_family_member(
        &self,
        family_member_id: i64,
        status: Option<AssociationStatus>,
    ) -> Result<Vec<AssociationView>> {
        let conn = self.conn()?;
        let sql = view_query(
            "WHERE s.family_member_id = ?1 AND (?2 IS NULL OR s.status = ?2)
             ORDER BY s.requested_at DESC, s.id DESC",
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![family_member_id, status.map(|s| s.as_str())], view)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    /// Approved associations of one admission: the audience for clinical updates
    pub fn approved_associations(&self, admission_id: i64) -> Result<Vec<AssociationView>> {
        let conn = self.conn()?;
        let sql = view_query("WHERE s.admission_id = ? AND s.status = ? ORDER BY s.id");
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![admission_id, AssociationStatus::Approved.as_str()], view)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admission, family_member};
    use infocare_core::{can_read_admission, AdmissionStatus, Principal};

    #[test]
    fn test_insert_is_pending() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);

        let assoc = store.insert_association(family.id, adm.id).unwrap();
        assert_eq!(assoc.status, AssociationStatus::Pending);

        let view = store.association_view(assoc.id).unwrap().unwrap();
        assert_eq!(view.patient_name, "Maria Souza");
        assert_eq!(view.family_member_email, family.email);
        assert_eq!(view.admission_status, AdmissionStatus::Active);
    }

    #[test]
    fn test_second_request_reports_existing_status() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);
        let first = store.insert_association(family.id, adm.id).unwrap();

        let err = store.insert_association(family.id, adm.id).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRequested(AssociationStatus::Pending)));

        store.set_association_status(first.id, AssociationStatus::Rejected).unwrap();
        let err = store.insert_association(family.id, adm.id).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRequested(AssociationStatus::Rejected)));

        assert_eq!(store.list_associations(None).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_admission_or_family_member() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);

        assert!(matches!(
            store.insert_association(family.id, 404).unwrap_err(),
            StoreError::NotFound { entity: "Admission", id: 404 }
        ));
        assert!(matches!(
            store.insert_association(505, adm.id).unwrap_err(),
            StoreError::NotFound { entity: "Family member", id: 505 }
        ));
    }

    #[test]
    fn test_discharged_admission_still_accepts_requests() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);
        store.discharge_admission(adm.id).unwrap();

        let assoc = store.insert_association(family.id, adm.id).unwrap();
        let view = store.association_view(assoc.id).unwrap().unwrap();
        assert_eq!(view.admission_status, AdmissionStatus::Discharged);
    }

    #[test]
    fn test_set_status_returns_previous() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);
        let assoc = store.insert_association(family.id, adm.id).unwrap();

        let previous = store.set_association_status(assoc.id, AssociationStatus::Approved).unwrap();
        assert_eq!(previous, AssociationStatus::Pending);
        let previous = store.set_association_status(assoc.id, AssociationStatus::Rejected).unwrap();
        assert_eq!(previous, AssociationStatus::Approved);

        assert!(matches!(
            store.set_association_status(999, AssociationStatus::Approved).unwrap_err(),
            StoreError::NotFound { entity: "Association", .. }
        ));
    }

    #[test]
    fn test_access_follows_persisted_state() {
        let store = SqliteStore::open(":memory:").unwrap();
        let family = family_member(&store, 1);
        let adm = admission(&store, 1, None);
        let principal = Principal::FamilyMember { id: family.id };
        let can_read = || {
            let assoc = store.find_association(family.id, adm.id).unwrap();
            can_read_admission(&principal, adm.id, assoc.as_ref())
        };

        let assoc = store.insert_association(family.id, adm.id).unwrap();
        assert!(!can_read());

        store.set_association_status(assoc.id, AssociationStatus::Approved).unwrap();
        assert!(can_read());

        store.delete_association(assoc.id).unwrap();
        assert!(!can_read());
    }

    #[test]
    fn test_list_ordering_and_filters() {
        let store = SqliteStore::open(":memory:").unwrap();
        let ana = family_member(&store, 1);
        let bia = family_member(&store, 2);
        let first_adm = admission(&store, 1, None);
        let second_adm = admission(&store, 2, None);

        let a1 = store.insert_association(ana.id, first_adm.id).unwrap();
        let a2 = store.insert_association(bia.id, first_adm.id).unwrap();
        let a3 = store.insert_association(ana.id, second_adm.id).unwrap();
        store.set_association_status(a2.id, AssociationStatus::Approved).unwrap();

        let queue: Vec<i64> = store
            .list_associations(None)
            .unwrap()
            .iter()
            .map(|v| v.association.id)
            .collect();
        assert_eq!(queue, vec![a1.id, a2.id, a3.id]);

        let pending: Vec<i64> = store
            .list_associations(Some(AssociationStatus::Pending))
            .unwrap()
            .iter()
            .map(|v| v.association.id)
            .collect();
        assert_eq!(pending, vec![a1.id, a3.id]);

        let mine: Vec<i64> = store
            .list_associations_for_family_member(ana.id, None)
            .unwrap()
            .iter()
            .map(|v| v.association.id)
            .collect();
        assert_eq!(mine, vec![a3.id, a1.id]);

        assert!(store
            .list_associations_for_family_member(ana.id, Some(AssociationStatus::Approved))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_approved_audience() {
        let store = SqliteStore::open(":memory:").unwrap();
        let ana = family_member(&store, 1);
        let bia = family_member(&store, 2);
        let adm = admission(&store, 1, None);

        let a1 = store.insert_association(ana.id, adm.id).unwrap();
        store.insert_association(bia.id, adm.id).unwrap();
        store.set_association_status(a1.id, AssociationStatus::Approved).unwrap();

        let audience = store.approved_associations(adm.id).unwrap();
        assert_eq!(audience.len(), 1);
        assert_eq!(audience[0].family_member_email, ana.email);
    }

    #[test]
    fn test_cascades() {
        let store = SqliteStore::open(":memory:").unwrap();
        let ana = family_member(&store, 1);
        let bia = family_member(&store, 2);
        let adm = admission(&store, 1, None);
        let other = admission(&store, 2, None);

        store.insert_association(ana.id, adm.id).unwrap();
        store.insert_association(bia.id, other.id).unwrap();

        store.delete_family_member(ana.id).unwrap();
        assert_eq!(store.list_associations(None).unwrap().len(), 1);

        store.delete_admission(other.id).unwrap();
        assert!(store.list_associations(None).unwrap().is_empty());
    }
}
