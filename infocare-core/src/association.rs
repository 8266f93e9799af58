//! Family-member access requests and their approval state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::admission::{AdmissionDetail, AdmissionStatus};
use crate::error::{InfoCareError, Result};
use crate::validation::Checker;

/// Approval state of an association.
///
/// Created as `Pending`; a professional moves it to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aprovada")]
    Approved,
    #[serde(rename = "rejeitada")]
    Rejected,
}

impl AssociationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationStatus::Pending => "pendente",
            AssociationStatus::Approved => "aprovada",
            AssociationStatus::Rejected => "rejeitada",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pendente" => Ok(AssociationStatus::Pending),
            "aprovada" => Ok(AssociationStatus::Approved),
            "rejeitada" => Ok(AssociationStatus::Rejected),
            other => Err(InfoCareError::validation(format!(
                "Invalid association status '{}': expected pendente, aprovada or rejeitada.",
                other
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AssociationStatus::Pending)
    }
}

impl fmt::Display for AssociationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an optional `?status=` query value
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<AssociationStatus>> {
    value.map(AssociationStatus::parse).transpose()
}

/// A professional's verdict on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> AssociationStatus {
        match self {
            Decision::Approve => AssociationStatus::Approved,
            Decision::Reject => AssociationStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Reject => "REJECT",
        }
    }
}

/// One family member's request to view one admission.
///
/// At most one exists per (family member, admission) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub id: i64,
    pub family_member_id: i64,
    pub admission_id: i64,
    pub status: AssociationStatus,
    pub requested_at: DateTime<Utc>,
}

/// Body of `POST /associations`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssociation {
    pub admission_id: i64,
}

impl NewAssociation {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.positive("admissionId", self.admission_id);
        check.finish()
    }
}

/// An association with the names a reviewer or requester needs resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationView {
    #[serde(flatten)]
    pub association: Association,
    pub patient_name: String,
    pub family_member_name: String,
    pub family_member_email: String,
    pub admission_status: AdmissionStatus,
}

/// Association summary plus, once approved, the clinical detail behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDetail {
    #[serde(flatten)]
    pub view: AssociationView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission: Option<AdmissionDetail>,
}
