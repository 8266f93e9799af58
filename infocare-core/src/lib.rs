pub mod access;
pub mod admission;
pub mod association;
pub mod error;
pub mod notification;
pub mod outcome;
pub mod patient;
pub mod people;
pub mod principal;
pub mod progress_note;
pub mod validation;

pub use access::{can_read_admission, can_view_association_detail, check_read_admission};
pub use admission::{
    Admission, AdmissionDetail, AdmissionStatus, AdmissionSummary, AdmissionUpdate, NewAdmission,
};
pub use association::{
    Association, AssociationDetail, AssociationStatus, AssociationView, Decision, NewAssociation,
};
pub use error::{ErrorKind, FieldIssue, InfoCareError, Result};
pub use notification::{Notification, NotificationEvent};
pub use outcome::{Acknowledgement, Outcome};
pub use patient::{NewPatient, Patient, PatientContactUpdate};
pub use people::{
    FamilyMember, FamilyMemberUpdate, NewFamilyMember, NewProfessional, Professional,
    ProfessionalKind, ProfessionalSummary,
};
pub use principal::{Principal, PrincipalKind};
pub use progress_note::{NewProgressNote, ProgressNote, ProgressNoteView};
