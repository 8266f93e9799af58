//! Read-access policy for admission records.
//!
//! Rules:
//! - Professional → always allowed
//! - Family member → allowed iff an APPROVED association links them to the admission
//!
//! Callers pass associations freshly read from the store; nothing here is cached,
//! so a rejection or deletion is visible on the next check.

use crate::association::{Association, AssociationStatus};
use crate::error::{InfoCareError, Result};
use crate::principal::Principal;

/// Decide whether `principal` may read the full detail of `admission_id`.
pub fn can_read_admission<'a, I>(principal: &Principal, admission_id: i64, associations: I) -> bool
where
    I: IntoIterator<Item = &'a Association>,
{
    match principal {
        Principal::Professional { .. } => true,
        Principal::FamilyMember { id } => associations.into_iter().any(|a| {
            a.family_member_id == *id
                && a.admission_id == admission_id
                && a.status == AssociationStatus::Approved
        }),
    }
}

/// Same as [`can_read_admission`], failing with `Forbidden` on denial
pub fn check_read_admission<'a, I>(principal: &Principal, admission_id: i64, associations: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Association>,
{
    if can_read_admission(principal, admission_id, associations) {
        Ok(())
    } else {
        Err(InfoCareError::Forbidden(
            "Access denied: you do not have permission to view this admission.".to_string(),
        ))
    }
}

/// Whether the nested clinical detail behind one association may be shown.
///
/// Family members may only look at their own associations; the detail is
/// revealed once that association is approved. Professionals see everything.
pub fn can_view_association_detail(principal: &Principal, association: &Association) -> Result<bool> {
    match principal {
        Principal::Professional { .. } => Ok(true),
        Principal::FamilyMember { id } if *id == association.family_member_id => {
            Ok(association.status == AssociationStatus::Approved)
        }
        Principal::FamilyMember { .. } => Err(InfoCareError::Forbidden(
            "Access denied: this association belongs to another family member.".to_string(),
        )),
    }
}
