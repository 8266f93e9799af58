use crate::error::{Result, StoreError};
use crate::rows::{self, ADMISSION_COLUMNS, ADMISSION_WIDTH, PATIENT_COLUMNS, PATIENT_WIDTH};
use crate::sqlite_store::SqliteStore;
use chrono::Utc;
use infocare_core::{
    Admission, AdmissionDetail, AdmissionStatus, AdmissionSummary, AdmissionUpdate, NewAdmission,
    ProgressNoteView,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

fn ensure_exists(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
    let found: Option<i64> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound { entity, id }),
    }
}

#[allow(clippy::result_large_err)]
impl SqliteStore {
    /// Open a new stay. Starts ACTIVE with `started_at` = now.
    pub fn insert_admission(&self, new: &NewAdmission) -> Result<Admission> {
        let conn = self.conn()?;
        ensure_exists(&conn, "patients", "Patient", new.patient_id)?;
        if let Some(professional_id) = new.responsible_professional_id {
            ensure_exists(&conn, "professionals", "Professional", professional_id)?;
        }

        let started_at = Utc::now();
        conn.execute(
            "INSERT INTO admissions
                 (patient_id, responsible_professional_id, diagnosis, notes, room, bed, started_at, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.patient_id,
                new.responsible_professional_id,
                new.diagnosis,
                new.notes,
                new.room,
                new.bed,
                started_at,
                AdmissionStatus::Active.as_str(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(admission_id = id, patient_id = new.patient_id, "Admission opened");

        Ok(Admission {
            id,
            patient_id: new.patient_id,
            responsible_professional_id: new.responsible_professional_id,
            diagnosis: new.diagnosis.clone(),
            notes: new.notes.clone(),
            room: new.room.clone(),
            bed: new.bed.clone(),
            started_at,
            discharged_at: None,
            status: AdmissionStatus::Active,
        })
    }

    pub fn get_admission(&self, id: i64) -> Result<Option<Admission>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM admissions a WHERE a.id = ?", ADMISSION_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], |row| rows::admission(row, 0))
            .optional()?)
    }

    /// Newest first, with patient and responsible professional resolved
    pub fn list_admissions(&self, status: Option<AdmissionStatus>) -> Result<Vec<AdmissionSummary>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {}, p.name, p.cpf, pr.id, pr.name, pr.kind, pr.specialty
             FROM admissions a
             JOIN patients p ON p.id = a.patient_id
             LEFT JOIN professionals pr ON pr.id = a.responsible_professional_id
             WHERE (?1 IS NULL OR a.status = ?1)
             ORDER BY a.started_at DESC, a.id DESC",
            ADMISSION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let summaries = stmt
            .query_map(params![status.map(|s| s.as_str())], |row| {
                Ok(AdmissionSummary {
                    admission: rows::admission(row, 0)?,
                    patient_name: row.get(ADMISSION_WIDTH)?,
                    patient_cpf: row.get(ADMISSION_WIDTH + 1)?,
                    responsible_professional: rows::professional_summary(row, ADMISSION_WIDTH + 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    }

    /// Full record: patient, responsible professional and the notes timeline (newest first)
    pub fn admission_detail(&self, id: i64) -> Result<Option<AdmissionDetail>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {}, {}, pr.id, pr.name, pr.kind, pr.specialty
             FROM admissions a
             JOIN patients p ON p.id = a.patient_id
             LEFT JOIN professionals pr ON pr.id = a.responsible_professional_id
             WHERE a.id = ?",
            ADMISSION_COLUMNS, PATIENT_COLUMNS
        );
        let head = conn
            .query_row(&sql, params![id], |row| {
                Ok((
                    rows::admission(row, 0)?,
                    rows::patient(row, ADMISSION_WIDTH)?,
                    rows::professional_summary(row, ADMISSION_WIDTH + PATIENT_WIDTH)?,
                ))
            })
            .optional()?;

        let Some((admission, patient, responsible_professional)) = head else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT n.id, n.admission_id, n.professional_id, n.description, n.recorded_at,
                    pr.name, pr.kind
             FROM progress_notes n
             JOIN professionals pr ON pr.id = n.professional_id
             WHERE n.admission_id = ?
             ORDER BY n.recorded_at DESC, n.id DESC",
        )?;
        let progress_notes = stmt
            .query_map(params![id], |row| {
                Ok(ProgressNoteView {
                    note: rows::progress_note(row, 0)?,
                    author_name: row.get(5)?,
                    author_kind: rows::professional_kind(row, 6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(AdmissionDetail {
            admission,
            patient,
            responsible_professional,
            progress_notes,
        }))
    }

    /// Apply a partial update; explicit nulls clear the column
    pub fn update_admission(&self, id: i64, update: &AdmissionUpdate) -> Result<Admission> {
        {
            let conn = self.conn()?;
            ensure_exists(&conn, "admissions", "Admission", id)?;

            let mut sets = Vec::new();
            let mut values: Vec<Value> = Vec::new();

            if let Some(professional_id) = update.responsible_professional_id {
                if let Some(pid) = professional_id {
                    ensure_exists(&conn, "professionals", "Professional", pid)?;
                }
                sets.push("responsible_professional_id = ?".to_string());
                values.push(professional_id.map(Value::Integer).unwrap_or(Value::Null));
            }
            for (column, field) in [
                ("diagnosis", &update.diagnosis),
                ("notes", &update.notes),
                ("room", &update.room),
                ("bed", &update.bed),
            ] {
                if let Some(value) = field {
                    sets.push(format!("{} = ?", column));
                    values.push(value.clone().map(Value::Text).unwrap_or(Value::Null));
                }
            }

            if !sets.is_empty() {
                values.push(Value::Integer(id));
                let sql = format!("UPDATE admissions SET {} WHERE id = ?", sets.join(", "));
                conn.execute(&sql, params_from_iter(values))?;
            }
        }

        self.get_admission(id)?
            .ok_or(StoreError::NotFound { entity: "Admission", id })
    }

    /// ACTIVE → DISCHARGED, exactly once
    pub fn discharge_admission(&self, id: i64) -> Result<Admission> {
        {
            let conn = self.conn()?;
            let rows = conn.execute(
                "UPDATE admissions SET status = ?, discharged_at = ? WHERE id = ? AND status = ?",
                params![
                    AdmissionStatus::Discharged.as_str(),
                    Utc::now(),
                    id,
                    AdmissionStatus::Active.as_str()
                ],
            )?;
            if rows == 0 {
                ensure_exists(&conn, "admissions", "Admission", id)?;
                return Err(StoreError::Blocked(format!(
                    "Admission {} has already been discharged.",
                    id
                )));
            }
        }
        tracing::debug!(admission_id = id, "Admission discharged");

        self.get_admission(id)?
            .ok_or(StoreError::NotFound { entity: "Admission", id })
    }

    /// Remove an admission with its notes and associations
    pub fn delete_admission(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM admissions WHERE id = ?", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound { entity: "Admission", id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admission, new_patient, professional};
    use infocare_core::ProfessionalKind;

    #[test]
    fn test_insert_unknown_patient() {
        let store = SqliteStore::open(":memory:").unwrap();
        let new = NewAdmission {
            patient_id: 77,
            responsible_professional_id: None,
            diagnosis: None,
            notes: None,
            room: None,
            bed: None,
        };
        assert!(matches!(
            store.insert_admission(&new).unwrap_err(),
            StoreError::NotFound { entity: "Patient", id: 77 }
        ));
    }

    #[test]
    fn test_insert_unknown_professional() {
        let store = SqliteStore::open(":memory:").unwrap();
        let patient = store.insert_patient(&new_patient("123.456.789-00")).unwrap();
        let new = NewAdmission {
            patient_id: patient.id,
            responsible_professional_id: Some(5),
            diagnosis: None,
            notes: None,
            room: None,
            bed: None,
        };
        assert!(matches!(
            store.insert_admission(&new).unwrap_err(),
            StoreError::NotFound { entity: "Professional", id: 5 }
        ));
    }

    #[test]
    fn test_new_admission_is_active() {
        let store = SqliteStore::open(":memory:").unwrap();
        let adm = admission(&store, 1, None);
        assert!(adm.is_open());
        assert!(adm.discharged_at.is_none());

        let loaded = store.get_admission(adm.id).unwrap().unwrap();
        assert_eq!(loaded.status, AdmissionStatus::Active);
        assert_eq!(loaded.room.as_deref(), Some("301"));
    }

    #[test]
    fn test_discharge_once() {
        let store = SqliteStore::open(":memory:").unwrap();
        let adm = admission(&store, 1, None);

        let discharged = store.discharge_admission(adm.id).unwrap();
        assert_eq!(discharged.status, AdmissionStatus::Discharged);
        assert!(discharged.discharged_at.is_some());

        assert!(matches!(
            store.discharge_admission(adm.id).unwrap_err(),
            StoreError::Blocked(_)
        ));
        assert!(matches!(
            store.discharge_admission(999).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() {
        let store = SqliteStore::open(":memory:").unwrap();
        let doctor = professional(&store, 1);
        let first = admission(&store, 1, Some(doctor.id));
        let second = admission(&store, 2, None);
        store.discharge_admission(first.id).unwrap();

        let all = store.list_admissions(None).unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.admission.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        let with_doctor = &all[1];
        assert_eq!(with_doctor.patient_name, "Maria Souza");
        assert_eq!(
            with_doctor.responsible_professional.as_ref().map(|p| p.kind),
            Some(ProfessionalKind::Medico)
        );

        let active = store.list_admissions(Some(AdmissionStatus::Active)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].admission.id, second.id);
    }

    #[test]
    fn test_update_sets_and_clears() {
        let store = SqliteStore::open(":memory:").unwrap();
        let doctor = professional(&store, 1);
        let adm = admission(&store, 1, Some(doctor.id));

        let update: AdmissionUpdate =
            serde_json::from_str(r#"{"room": null, "diagnosis": "Sepsis", "responsibleProfessionalId": null}"#)
                .unwrap();
        let updated = store.update_admission(adm.id, &update).unwrap();
        assert_eq!(updated.room, None);
        assert_eq!(updated.bed.as_deref(), Some("B"));
        assert_eq!(updated.diagnosis.as_deref(), Some("Sepsis"));
        assert_eq!(updated.responsible_professional_id, None);

        let bad: AdmissionUpdate = serde_json::from_str(r#"{"responsibleProfessionalId": 99}"#).unwrap();
        assert!(matches!(
            store.update_admission(adm.id, &bad).unwrap_err(),
            StoreError::NotFound { entity: "Professional", .. }
        ));
    }

    #[test]
    fn test_detail_includes_notes_newest_first() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        let adm = admission(&store, 1, Some(nurse.id));

        let first = store.create_progress_note(adm.id, nurse.id, "Stable overnight").unwrap();
        let second = store.create_progress_note(adm.id, nurse.id, "Fever at 06:00").unwrap();

        let detail = store.admission_detail(adm.id).unwrap().unwrap();
        assert_eq!(detail.patient.name, "Maria Souza");
        let ids: Vec<i64> = detail.progress_notes.iter().map(|n| n.note.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(detail.progress_notes[0].author_name, nurse.name);
        assert_eq!(detail.progress_notes[0].author_kind, ProfessionalKind::Medico);

        assert!(store.admission_detail(999).unwrap().is_none());
    }

    #[test]
    fn test_delete_cascades_notes() {
        let store = SqliteStore::open(":memory:").unwrap();
        let nurse = professional(&store, 1);
        let adm = admission(&store, 1, None);
        store.create_progress_note(adm.id, nurse.id, "Stable overnight").unwrap();

        store.delete_admission(adm.id).unwrap();
        assert!(store.get_admission(adm.id).unwrap().is_none());
        let remaining: i64 = store
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM progress_notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
