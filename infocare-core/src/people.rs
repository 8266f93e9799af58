//! Family members and clinical professionals.
//!
//! Credentials are held by the external identity provider; these records carry
//! only profile and contact data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InfoCareError, Result};
use crate::validation::Checker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFamilyMember {
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewFamilyMember {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.min_chars("name", &self.name, 3);
        check.cpf("cpf", &self.cpf);
        check.email("email", &self.email);
        if let Some(ref phone) = self.phone {
            check.phone("phone", phone);
        }
        check.finish()
    }
}

/// Body of `PUT /family-members/me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// An empty string clears the stored phone
    pub phone: Option<String>,
}

impl FamilyMemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(InfoCareError::validation("No data supplied for update."));
        }
        let mut check = Checker::new();
        if let Some(ref name) = self.name {
            check.min_chars("name", name, 3);
        }
        if let Some(ref email) = self.email {
            check.email("email", email);
        }
        if let Some(ref phone) = self.phone {
            check.phone("phone", phone);
        }
        check.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfessionalKind {
    Medico,
    Enfermeiro,
    Tecnico,
    #[default]
    Outro,
}

impl ProfessionalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfessionalKind::Medico => "MEDICO",
            ProfessionalKind::Enfermeiro => "ENFERMEIRO",
            ProfessionalKind::Tecnico => "TECNICO",
            ProfessionalKind::Outro => "OUTRO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MEDICO" => Some(ProfessionalKind::Medico),
            "ENFERMEIRO" => Some(ProfessionalKind::Enfermeiro),
            "TECNICO" => Some(ProfessionalKind::Tecnico),
            "OUTRO" => Some(ProfessionalKind::Outro),
            _ => None,
        }
    }
}

impl fmt::Display for ProfessionalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: Option<String>,
    pub crm: Option<String>,
    pub coren: Option<String>,
    pub specialty: Option<String>,
    pub kind: ProfessionalKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfessional {
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub crm: Option<String>,
    #[serde(default)]
    pub coren: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub kind: ProfessionalKind,
}

impl NewProfessional {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.min_chars("name", &self.name, 3);
        check.cpf("cpf", &self.cpf);
        check.email("email", &self.email);
        check.finish()
    }
}

/// Name and role shown next to admissions and progress notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalSummary {
    pub id: i64,
    pub name: String,
    pub kind: ProfessionalKind,
    pub specialty: Option<String>,
}
