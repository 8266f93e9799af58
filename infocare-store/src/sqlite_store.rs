//! SQLite-backed ward record store
//!
//! Schema:
//!   - patients, family_members, professionals: identity records
//!   - admissions: one row per stay, ATIVA until discharged
//!   - progress_notes: clinical timeline, cascades with its admission
//!   - associations: access requests, UNIQUE per (family member, admission)

use crate::error::{Result, StoreError};
use infocare_core::{AdmissionStatus, AssociationStatus, ProgressNote};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::ops::Deref;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    cpf TEXT NOT NULL UNIQUE,
    phone TEXT,
    birth_date TEXT NOT NULL,
    blood_type TEXT
);

CREATE TABLE IF NOT EXISTS family_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    cpf TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS professionals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    cpf TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    crm TEXT UNIQUE,
    coren TEXT UNIQUE,
    specialty TEXT,
    kind TEXT NOT NULL DEFAULT 'OUTRO'
);

CREATE TABLE IF NOT EXISTS admissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    responsible_professional_id INTEGER REFERENCES professionals(id) ON DELETE SET NULL,
    diagnosis TEXT,
    notes TEXT,
    room TEXT,
    bed TEXT,
    started_at TEXT NOT NULL,
    discharged_at TEXT,
    status TEXT NOT NULL DEFAULT 'ATIVA' CHECK (status IN ('ATIVA', 'ALTA')),
    CHECK ((status = 'ALTA') = (discharged_at IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS progress_notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    admission_id INTEGER NOT NULL REFERENCES admissions(id) ON DELETE CASCADE,
    professional_id INTEGER NOT NULL REFERENCES professionals(id),
    description TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS associations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    family_member_id INTEGER NOT NULL REFERENCES family_members(id) ON DELETE CASCADE,
    admission_id INTEGER NOT NULL REFERENCES admissions(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pendente'
        CHECK (status IN ('pendente', 'aprovada', 'rejeitada')),
    requested_at TEXT NOT NULL,
    UNIQUE (family_member_id, admission_id)
);

CREATE INDEX IF NOT EXISTS idx_admissions_status ON admissions(status);
CREATE INDEX IF NOT EXISTS idx_notes_admission ON progress_notes(admission_id);
CREATE INDEX IF NOT EXISTS idx_associations_admission ON associations(admission_id, status);
CREATE INDEX IF NOT EXISTS idx_associations_requested ON associations(requested_at);
"#;

/// SQLite-based ward record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[allow(clippy::result_large_err)]
impl SqliteStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL for read-write concurrency; FK enforcement is per-connection in SQLite
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!("Ward record schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Other("connection mutex poisoned".to_string()))
    }

    /// Execute multiple operations atomically within an SQLite transaction
    pub fn in_transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&TransactionOps<'_>) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(StoreError::from)?;
        let ops = TransactionOps { tx: &tx };
        let result = f(&ops)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(result)
    }
}

/// Operations available within a transaction
pub struct TransactionOps<'a> {
    tx: &'a Transaction<'a>,
}

#[allow(clippy::result_large_err)]
impl<'a> TransactionOps<'a> {
    /// Current status of an admission, `None` if it does not exist
    pub fn admission_status(&self, admission_id: i64) -> Result<Option<AdmissionStatus>> {
        let conn = self.tx.deref();
        let raw: Option<String> = conn
            .query_row(
                "SELECT status FROM admissions WHERE id = ?",
                params![admission_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| {
            AdmissionStatus::parse(&s)
                .map_err(|_| StoreError::Corrupt(format!("admission status '{}'", s)))
        })
        .transpose()
    }

    /// Insert a progress note; the caller is responsible for the status check
    pub fn insert_progress_note(
        &self,
        admission_id: i64,
        professional_id: i64,
        description: &str,
    ) -> Result<ProgressNote> {
        let conn = self.tx.deref();
        let recorded_at = chrono::Utc::now();
        conn.execute(
            "INSERT INTO progress_notes (admission_id, professional_id, description, recorded_at)
             VALUES (?, ?, ?, ?)",
            params![admission_id, professional_id, description, recorded_at],
        )?;
        Ok(ProgressNote {
            id: conn.last_insert_rowid(),
            admission_id,
            professional_id,
            description: description.to_string(),
            recorded_at,
        })
    }

    /// Current status of an association, `None` if it does not exist
    pub fn association_status(&self, association_id: i64) -> Result<Option<AssociationStatus>> {
        let conn = self.tx.deref();
        let raw: Option<String> = conn
            .query_row(
                "SELECT status FROM associations WHERE id = ?",
                params![association_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| {
            AssociationStatus::parse(&s)
                .map_err(|_| StoreError::Corrupt(format!("association status '{}'", s)))
        })
        .transpose()
    }

    /// Overwrite an association's status. Returns false if no row matched.
    pub fn set_association_status(&self, association_id: i64, status: AssociationStatus) -> Result<bool> {
        let conn = self.tx.deref();
        let rows = conn.execute(
            "UPDATE associations SET status = ? WHERE id = ?",
            params![status.as_str(), association_id],
        )?;
        Ok(rows > 0)
    }
}
