//! Fixtures for store unit tests

use crate::sqlite_store::SqliteStore;
use chrono::NaiveDate;
use infocare_core::{
    Admission, FamilyMember, NewAdmission, NewFamilyMember, NewPatient, NewProfessional,
    Professional, ProfessionalKind,
};

pub(crate) fn new_patient(cpf: &str) -> NewPatient {
    NewPatient {
        name: "Maria Souza".to_string(),
        cpf: cpf.to_string(),
        phone: None,
        birth_date: NaiveDate::from_ymd_opt(1950, 3, 14).unwrap(),
        blood_type: Some("O+".to_string()),
    }
}

pub(crate) fn new_family_member(n: u32) -> NewFamilyMember {
    NewFamilyMember {
        name: format!("Family Member {}", n),
        cpf: format!("{:03}.000.000-00", n),
        email: format!("family{}@example.com", n),
        phone: None,
    }
}

pub(crate) fn new_professional(n: u32) -> NewProfessional {
    NewProfessional {
        name: format!("Dr. Carlos {}", n),
        cpf: format!("{:03}.111.111-11", n),
        email: format!("carlos{}@hospital.org", n),
        phone: None,
        crm: Some(format!("CRM-{}", n)),
        coren: None,
        specialty: Some("Cardiology".to_string()),
        kind: ProfessionalKind::Medico,
    }
}

pub(crate) fn family_member(store: &SqliteStore, n: u32) -> FamilyMember {
    store.insert_family_member(&new_family_member(n)).unwrap()
}

pub(crate) fn professional(store: &SqliteStore, n: u32) -> Professional {
    store.insert_professional(&new_professional(n)).unwrap()
}

/// A fresh patient with one ACTIVE admission under `professional_id`
pub(crate) fn admission(store: &SqliteStore, n: u32, professional_id: Option<i64>) -> Admission {
    let patient = store
        .insert_patient(&new_patient(&format!("{:03}.222.222-22", n)))
        .unwrap();
    store
        .insert_admission(&NewAdmission {
            patient_id: patient.id,
            responsible_professional_id: professional_id,
            diagnosis: Some("Pneumonia".to_string()),
            notes: None,
            room: Some("301".to_string()),
            bed: Some("B".to_string()),
        })
        .unwrap()
}
