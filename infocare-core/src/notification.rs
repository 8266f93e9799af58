//! Outbound messages to family members.

use serde::{Deserialize, Serialize};

use crate::association::{AssociationView, Decision};
use crate::people::FamilyMember;

/// What a notification announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    Welcome,
    AssociationRequested,
    AssociationApproved,
    AssociationRejected,
    ProgressNoteAdded,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::Welcome => "welcome",
            NotificationEvent::AssociationRequested => "association_requested",
            NotificationEvent::AssociationApproved => "association_approved",
            NotificationEvent::AssociationRejected => "association_rejected",
            NotificationEvent::ProgressNoteAdded => "progress_note_added",
        }
    }
}

/// A rendered e-mail ready for the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event: NotificationEvent,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Notification {
    pub fn welcome(member: &FamilyMember) -> Self {
        Self {
            event: NotificationEvent::Welcome,
            to: member.email.clone(),
            subject: "[InfoCare] Welcome to InfoCare".to_string(),
            html: format!(
                "Hello, {}.<br><br>Your InfoCare account has been created.<br><br>\
                 Next, sign in and request access to an admission to start receiving updates.",
                escape_html(&member.name)
            ),
        }
    }

    pub fn association_requested(view: &AssociationView) -> Self {
        Self {
            event: NotificationEvent::AssociationRequested,
            to: view.family_member_email.clone(),
            subject: format!("[InfoCare] Access request received for {}", view.patient_name),
            html: format!(
                "Hello, {}.<br>Your request to follow the admission of <b>{}</b> was registered \
                 and is awaiting review by the care team.",
                escape_html(&view.family_member_name),
                escape_html(&view.patient_name)
            ),
        }
    }

    pub fn association_decided(view: &AssociationView, decision: Decision) -> Self {
        let (event, verb) = match decision {
            Decision::Approve => (NotificationEvent::AssociationApproved, "approved"),
            Decision::Reject => (NotificationEvent::AssociationRejected, "rejected"),
        };
        Self {
            event,
            to: view.family_member_email.clone(),
            subject: format!("[InfoCare] Access request {} for {}", verb, view.patient_name),
            html: format!(
                "Hello, {}.<br>Your request to follow the admission of <b>{}</b> was <b>{}</b>.",
                escape_html(&view.family_member_name),
                escape_html(&view.patient_name),
                verb
            ),
        }
    }

    pub fn progress_note_added(recipient_name: &str, recipient_email: &str, patient_name: &str) -> Self {
        Self {
            event: NotificationEvent::ProgressNoteAdded,
            to: recipient_email.to_string(),
            subject: format!("[InfoCare] New update for {}", patient_name),
            html: format!(
                "Hello, {}.<br>A new progress note was recorded for <b>{}</b>.",
                escape_html(recipient_name),
                escape_html(patient_name)
            ),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AdmissionStatus;
    use crate::association::{Association, AssociationStatus};
    use chrono::Utc;

    fn view() -> AssociationView {
        AssociationView {
            association: Association {
                id: 1,
                family_member_id: 10,
                admission_id: 5,
                status: AssociationStatus::Approved,
                requested_at: Utc::now(),
            },
            patient_name: "Maria <Souza>".to_string(),
            family_member_name: "Ana".to_string(),
            family_member_email: "ana@example.com".to_string(),
            admission_status: AdmissionStatus::Active,
        }
    }

    #[test]
    fn test_decision_messages() {
        let approved = Notification::association_decided(&view(), Decision::Approve);
        assert_eq!(approved.event, NotificationEvent::AssociationApproved);
        assert_eq!(approved.to, "ana@example.com");
        assert!(approved.html.contains("approved"));

        let rejected = Notification::association_decided(&view(), Decision::Reject);
        assert_eq!(rejected.event, NotificationEvent::AssociationRejected);
        assert!(rejected.subject.contains("rejected"));
    }

    #[test]
    fn test_patient_name_is_escaped_in_body() {
        let message = Notification::association_requested(&view());
        assert!(message.html.contains("Maria &lt;Souza&gt;"));
        assert!(!message.html.contains("<Souza>"));
    }
}
