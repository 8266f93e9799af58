//! Authenticated request actors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InfoCareError, Result};

/// Role tag carried in bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    #[serde(rename = "familiar")]
    FamilyMember,
    #[serde(rename = "profissional")]
    Professional,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::FamilyMember => "familiar",
            PrincipalKind::Professional => "profissional",
        }
    }

    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "familiar" => Ok(PrincipalKind::FamilyMember),
            "profissional" => Ok(PrincipalKind::Professional),
            other => Err(InfoCareError::UnknownPrincipal(other.to_string())),
        }
    }
}

/// The verified actor of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    FamilyMember { id: i64 },
    Professional { id: i64 },
}

impl Principal {
    /// Build a principal from a resolved subject id and role tag
    pub fn from_claims(id: i64, tag: &str) -> Result<Self> {
        if id <= 0 {
            return Err(InfoCareError::Unauthorized(
                "Token subject must be a positive identifier.".to_string(),
            ));
        }
        Ok(match PrincipalKind::parse(tag)? {
            PrincipalKind::FamilyMember => Principal::FamilyMember { id },
            PrincipalKind::Professional => Principal::Professional { id },
        })
    }

    pub fn id(&self) -> i64 {
        match self {
            Principal::FamilyMember { id } | Principal::Professional { id } => *id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::FamilyMember { .. } => PrincipalKind::FamilyMember,
            Principal::Professional { .. } => PrincipalKind::Professional,
        }
    }

    /// Family member id, or `Forbidden` for any other role
    pub fn require_family_member(&self) -> Result<i64> {
        match self {
            Principal::FamilyMember { id } => Ok(*id),
            Principal::Professional { .. } => Err(InfoCareError::Forbidden(
                "Access denied: this operation is only available to family members.".to_string(),
            )),
        }
    }

    /// Professional id, or `Forbidden` for any other role
    pub fn require_professional(&self) -> Result<i64> {
        match self {
            Principal::Professional { id } => Ok(*id),
            Principal::FamilyMember { .. } => Err(InfoCareError::Forbidden(
                "Access denied: this operation is only available to professionals.".to_string(),
            )),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind().as_str(), self.id())
    }
}
