use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::people::ProfessionalKind;
use crate::validation::Checker;

/// Clinical entry tied to one admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    pub id: i64,
    pub admission_id: i64,
    pub professional_id: i64,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressNote {
    pub admission_id: i64,
    pub description: String,
}

impl NewProgressNote {
    pub fn validate(&self) -> Result<()> {
        let mut check = Checker::new();
        check.positive("admissionId", self.admission_id);
        check.min_chars("description", &self.description, 5);
        check.finish()
    }
}

/// A note with its author resolved, as shown in the admission timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNoteView {
    #[serde(flatten)]
    pub note: ProgressNote,
    pub author_name: String,
    pub author_kind: ProfessionalKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_minimum() {
        let note = NewProgressNote {
            admission_id: 1,
            description: "ok".to_string(),
        };
        assert!(note.validate().is_err());

        let note = NewProgressNote {
            admission_id: 1,
            description: "Patient stable, afebrile.".to_string(),
        };
        assert!(note.validate().is_ok());
    }
}
