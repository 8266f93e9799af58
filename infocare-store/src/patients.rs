use crate::error::{Result, StoreError};
use crate::rows::{self, PATIENT_COLUMNS};
use crate::sqlite_store::SqliteStore;
use infocare_core::{NewPatient, Patient};
use rusqlite::{params, OptionalExtension};

#[allow(clippy::result_large_err)]
impl SqliteStore {
    pub fn insert_patient(&self, new: &NewPatient) -> Result<Patient> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO patients (name, cpf, phone, birth_date, blood_type) VALUES (?, ?, ?, ?, ?)",
            params![new.name.trim(), new.cpf, new.phone, new.birth_date, new.blood_type],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(patient_id = id, "Patient stored");

        Ok(Patient {
            id,
            name: new.name.trim().to_string(),
            cpf: new.cpf.clone(),
            phone: new.phone.clone(),
            birth_date: new.birth_date,
            blood_type: new.blood_type.clone(),
        })
    }

    pub fn get_patient(&self, id: i64) -> Result<Option<Patient>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM patients p WHERE p.id = ?", PATIENT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], |row| rows::patient(row, 0))
            .optional()?)
    }

    pub fn list_patients(&self) -> Result<Vec<Patient>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM patients p ORDER BY p.name, p.id", PATIENT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let patients = stmt
            .query_map([], |row| rows::patient(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(patients)
    }

    /// Replace the contact phone; an empty value clears it
    pub fn update_patient_phone(&self, id: i64, phone: &str) -> Result<Patient> {
        {
            let conn = self.conn()?;
            let phone = (!phone.is_empty()).then_some(phone);
            let rows = conn.execute("UPDATE patients SET phone = ? WHERE id = ?", params![phone, id])?;
            if rows == 0 {
                return Err(StoreError::NotFound { entity: "Patient", id });
            }
        }
        self.get_patient(id)?
            .ok_or(StoreError::NotFound { entity: "Patient", id })
    }
}
