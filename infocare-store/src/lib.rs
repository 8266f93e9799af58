pub mod error;
pub mod sqlite_store;
pub mod sqlite_audit;

mod admissions;
mod associations;
mod patients;
mod people;
mod progress_notes;
mod rows;

#[cfg(test)]
mod test_support;

pub use error::{Result, StoreError};
pub use sqlite_store::{SqliteStore, TransactionOps};
pub use sqlite_audit::{AuditEntry, AuditLog, AuditRecord, AuditResult, Operation};
