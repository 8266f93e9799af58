use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::Checker;

/// Patient identity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub blood_type: Option<String>,
}

/// Body of `POST /patients`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub blood_type: Option<String>,
}

impl NewPatient {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.min_chars("name", &self.name, 3);
        check.cpf("cpf", &self.cpf);
        check.finish()
    }
}

/// Body of `PUT /patients/{id}`. Identity fields are immutable; only contact data changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContactUpdate {
    /// An empty string clears the stored phone
    pub phone: Option<String>,
}

impl PatientContactUpdate {
    pub fn validate(&self) -> Result<()> {
        match self.phone {
            None => Err(crate::InfoCareError::validation("No data supplied for update.")),
            Some(ref phone) => {
                let mut check = Checker::new();
                check.phone("phone", phone);
                check.finish()
            }
        }
    }
}
