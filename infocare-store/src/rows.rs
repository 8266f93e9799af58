//! Column lists and row mappers shared by the entity modules.
//!
//! Every mapper takes a `base` offset so joined queries can place several
//! entities side by side in one result row.

use infocare_core::{
    Admission, AdmissionStatus, Association, AssociationStatus, FamilyMember, Patient,
    Professional, ProfessionalKind, ProfessionalSummary, ProgressNote,
};
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) const PATIENT_COLUMNS: &str = "p.id, p.name, p.cpf, p.phone, p.birth_date, p.blood_type";
pub(crate) const PATIENT_WIDTH: usize = 6;

pub(crate) const FAMILY_COLUMNS: &str = "f.id, f.name, f.cpf, f.email, f.phone";

pub(crate) const PROFESSIONAL_COLUMNS: &str =
    "pr.id, pr.name, pr.cpf, pr.email, pr.phone, pr.crm, pr.coren, pr.specialty, pr.kind";

pub(crate) const ADMISSION_COLUMNS: &str = "a.id, a.patient_id, a.responsible_professional_id, \
     a.diagnosis, a.notes, a.room, a.bed, a.started_at, a.discharged_at, a.status";
pub(crate) const ADMISSION_WIDTH: usize = 10;

pub(crate) const ASSOCIATION_COLUMNS: &str =
    "s.id, s.family_member_id, s.admission_id, s.status, s.requested_at";
pub(crate) const ASSOCIATION_WIDTH: usize = 5;

fn enum_column<T>(row: &Row, idx: usize, parse: impl Fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value '{}'", raw).into(),
        )
    })
}

pub(crate) fn patient(row: &Row, base: usize) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        cpf: row.get(base + 2)?,
        phone: row.get(base + 3)?,
        birth_date: row.get(base + 4)?,
        blood_type: row.get(base + 5)?,
    })
}

pub(crate) fn family_member(row: &Row, base: usize) -> rusqlite::Result<FamilyMember> {
    Ok(FamilyMember {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        cpf: row.get(base + 2)?,
        email: row.get(base + 3)?,
        phone: row.get(base + 4)?,
    })
}

pub(crate) fn professional(row: &Row, base: usize) -> rusqlite::Result<Professional> {
    Ok(Professional {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        cpf: row.get(base + 2)?,
        email: row.get(base + 3)?,
        phone: row.get(base + 4)?,
        crm: row.get(base + 5)?,
        coren: row.get(base + 6)?,
        specialty: row.get(base + 7)?,
        kind: professional_kind(row, base + 8)?,
    })
}

pub(crate) fn professional_kind(row: &Row, idx: usize) -> rusqlite::Result<ProfessionalKind> {
    enum_column(row, idx, ProfessionalKind::parse)
}

/// `(id, name, kind, specialty)`, all nullable for LEFT JOINs
pub(crate) fn professional_summary(row: &Row, base: usize) -> rusqlite::Result<Option<ProfessionalSummary>> {
    let id: Option<i64> = row.get(base)?;
    match id {
        None => Ok(None),
        Some(id) => Ok(Some(ProfessionalSummary {
            id,
            name: row.get(base + 1)?,
            kind: professional_kind(row, base + 2)?,
            specialty: row.get(base + 3)?,
        })),
    }
}

pub(crate) fn admission(row: &Row, base: usize) -> rusqlite::Result<Admission> {
    Ok(Admission {
        id: row.get(base)?,
        patient_id: row.get(base + 1)?,
        responsible_professional_id: row.get(base + 2)?,
        diagnosis: row.get(base + 3)?,
        notes: row.get(base + 4)?,
        room: row.get(base + 5)?,
        bed: row.get(base + 6)?,
        started_at: row.get(base + 7)?,
        discharged_at: row.get(base + 8)?,
        status: admission_status(row, base + 9)?,
    })
}

pub(crate) fn admission_status(row: &Row, idx: usize) -> rusqlite::Result<AdmissionStatus> {
    enum_column(row, idx, |s| AdmissionStatus::parse(s).ok())
}

pub(crate) fn association(row: &Row, base: usize) -> rusqlite::Result<Association> {
    Ok(Association {
        id: row.get(base)?,
        family_member_id: row.get(base + 1)?,
        admission_id: row.get(base + 2)?,
        status: association_status(row, base + 3)?,
        requested_at: row.get(base + 4)?,
    })
}

pub(crate) fn association_status(row: &Row, idx: usize) -> rusqlite::Result<AssociationStatus> {
    enum_column(row, idx, |s| AssociationStatus::parse(s).ok())
}

pub(crate) fn progress_note(row: &Row, base: usize) -> rusqlite::Result<ProgressNote> {
    Ok(ProgressNote {
        id: row.get(base)?,
        admission_id: row.get(base + 1)?,
        professional_id: row.get(base + 2)?,
        description: row.get(base + 3)?,
        recorded_at: row.get(base + 4)?,
    })
}
