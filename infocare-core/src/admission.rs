use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{InfoCareError, Result};
use crate::patient::Patient;
use crate::people::ProfessionalSummary;
use crate::progress_note::ProgressNoteView;
use crate::validation::Checker;

/// Open/closed lifecycle of a stay. `Discharged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionStatus {
    #[serde(rename = "ATIVA")]
    Active,
    #[serde(rename = "ALTA")]
    Discharged,
}

impl AdmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Active => "ATIVA",
            AdmissionStatus::Discharged => "ALTA",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "ATIVA" => Ok(AdmissionStatus::Active),
            "ALTA" => Ok(AdmissionStatus::Discharged),
            other => Err(InfoCareError::validation(format!(
                "Invalid admission status '{}': expected ATIVA or ALTA.",
                other
            ))),
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hospital stay of one patient.
///
/// `discharged_at` is set iff `status` is `Discharged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: i64,
    pub patient_id: i64,
    pub responsible_professional_id: Option<i64>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub room: Option<String>,
    pub bed: Option<String>,
    pub started_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub status: AdmissionStatus,
}

impl Admission {
    pub fn is_open(&self) -> bool {
        self.status == AdmissionStatus::Active
    }
}

/// Body of `POST /admissions`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmission {
    pub patient_id: i64,
    #[serde(default)]
    pub responsible_professional_id: Option<i64>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub bed: Option<String>,
}

impl NewAdmission {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.positive("patientId", self.patient_id);
        if let Some(id) = self.responsible_professional_id {
            check.positive("responsibleProfessionalId", id);
        }
        check.finish()
    }
}

/// Body of `PUT /admissions/{id}`.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionUpdate {
    #[serde(default, deserialize_with = "present")]
    pub responsible_professional_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub diagnosis: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub room: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub bed: Option<Option<String>>,
}

impl AdmissionUpdate {
    pub fn is_empty(&self) -> bool {
        self.responsible_professional_id.is_none()
            && self.diagnosis.is_none()
            && self.notes.is_none()
            && self.room.is_none()
            && self.bed.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(InfoCareError::validation("No data supplied for update."));
        }
        let mut check = Checker::new();
        if let Some(Some(id)) = self.responsible_professional_id {
            check.positive("responsibleProfessionalId", id);
        }
        check.finish()
    }
}

/// Distinguishes an explicit `null` from an absent key
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Row of the admission listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionSummary {
    #[serde(flatten)]
    pub admission: Admission,
    pub patient_name: String,
    pub patient_cpf: String,
    pub responsible_professional: Option<ProfessionalSummary>,
}

/// Full admission record, including the clinical timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionDetail {
    #[serde(flatten)]
    pub admission: Admission,
    pub patient: Patient,
    pub responsible_professional: Option<ProfessionalSummary>,
    /// Newest first
    pub progress_notes: Vec<ProgressNoteView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(AdmissionStatus::Active).unwrap(), "ATIVA");
        assert_eq!(serde_json::to_value(AdmissionStatus::Discharged).unwrap(), "ALTA");
        assert_eq!(AdmissionStatus::parse("ALTA").unwrap(), AdmissionStatus::Discharged);
        assert!(AdmissionStatus::parse("alta").is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: AdmissionUpdate =
            serde_json::from_str(r#"{"room": null, "bed": "12B"}"#).unwrap();
        assert_eq!(update.room, Some(None));
        assert_eq!(update.bed, Some(Some("12B".to_string())));
        assert_eq!(update.diagnosis, None);
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_empty_update_rejected() {
        let update: AdmissionUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_new_admission_requires_positive_patient() {
        let admission: NewAdmission = serde_json::from_str(r#"{"patientId": 0}"#).unwrap();
        assert!(admission.validate().is_err());
    }
}
