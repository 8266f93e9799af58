//! SQLite-based audit log
//!
//! Kept in its own database file so it can be rotated without touching ward records.

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Approve,
    Reject,
    Discharge,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Approve => "approve",
            Operation::Reject => "reject",
            Operation::Discharge => "discharge",
            Operation::Delete => "delete",
        }
    }
}

/// How an audited operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditResult {
    Success,
    /// Refused by the access policy
    Denied,
    Error,
}

impl AuditResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResult::Success => "success",
            AuditResult::Denied => "denied",
            AuditResult::Error => "error",
        }
    }
}

/// One audit row
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub operation: Operation,
    pub entity: &'a str,
    pub entity_id: Option<i64>,
    /// `kind/id` of the acting principal
    pub principal: Option<&'a str>,
    pub client_ip: Option<&'a str>,
    pub result: AuditResult,
    pub error_message: Option<&'a str>,
}

/// Stored audit row, as returned by [`AuditLog::recent_entries`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: String,
    pub operation: String,
    pub entity: String,
    pub entity_id: Option<i64>,
    pub principal: Option<String>,
    pub result: String,
}

/// Audit log
pub struct AuditLog {
    conn: Connection,
}

#[allow(clippy::result_large_err)]
impl AuditLog {
    /// Open the audit log (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let audit = Self { conn };
        audit.initialize()?;
        Ok(audit)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                operation TEXT NOT NULL,
                entity TEXT NOT NULL,
                entity_id INTEGER,
                principal TEXT,
                client_ip TEXT,
                result TEXT NOT NULL,
                error_message TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_log(entity, entity_id);
            CREATE INDEX IF NOT EXISTS idx_audit_principal ON audit_log(principal);
            "#,
        )?;
        Ok(())
    }

    /// Record an audit log entry
    pub fn log(&self, entry: &AuditEntry<'_>) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO audit_log
            (operation, entity, entity_id, principal, client_ip, result, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.operation.as_str(),
                entry.entity,
                entry.entity_id,
                entry.principal,
                entry.client_ip,
                entry.result.as_str(),
                entry.error_message,
            ],
        )?;
        Ok(())
    }

    /// Most recent entries first
    pub fn recent_entries(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, operation, entity, entity_id, principal, result
            FROM audit_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AuditRecord {
                timestamp: row.get(0)?,
                operation: row.get(1)?,
                entity: row.get(2)?,
                entity_id: row.get(3)?,
                principal: row.get(4)?,
                result: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
