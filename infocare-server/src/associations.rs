//! Association lifecycle: request, decide, revoke, list.
//!
//! Every operation checks the principal's role first, so authorization
//! failures happen before any store mutation.

use infocare_core::{
    access, Association, AssociationDetail, AssociationStatus, AssociationView, Decision, InfoCareError,
    NewAssociation, Notification, Principal, Result,
};

use crate::AppState;

/// A family member asks to follow an admission. Starts PENDING.
///
/// The confirmation e-mail is fire-and-forget; its failure never undoes the request.
pub fn create(state: &AppState, principal: &Principal, new: &NewAssociation) -> Result<AssociationView> {
    let family_member_id = principal.require_family_member()?;
    new.validate()?;

    let association = state.store.insert_association(family_member_id, new.admission_id)?;
    let view = state
        .store
        .association_view(association.id)?
        .ok_or_else(|| InfoCareError::not_found("Association", association.id))?;

    tracing::info!(
        association_id = association.id,
        family_member_id,
        admission_id = new.admission_id,
        "Association requested"
    );

    state
        .notifier
        .dispatch_detached(Notification::association_requested(&view));

    Ok(view)
}

/// A professional approves or rejects a request.
///
/// The new status is committed before the family member is notified. With
/// `strict_decisions` a failed notification is reported as
/// `NotificationFailure` carrying the committed association.
pub async fn decide(
    state: &AppState,
    principal: &Principal,
    association_id: i64,
    decision: Decision,
) -> Result<AssociationView> {
    let professional_id = principal.require_professional()?;
    let target = decision.target_status();

    let previous = state.store.set_association_status(association_id, target)?;
    if previous.is_terminal() {
        tracing::warn!(
            association_id,
            professional_id,
            previous = %previous,
            new = %target,
            "Re-deciding an association that was already decided"
        );
    }

    let view = state
        .store
        .association_view(association_id)?
        .ok_or_else(|| InfoCareError::not_found("Association", association_id))?;

    tracing::info!(
        association_id,
        professional_id,
        admission_id = view.association.admission_id,
        family_member_id = view.association.family_member_id,
        decision = decision.as_str(),
        "Association decided"
    );

    let notification = Notification::association_decided(&view, decision);
    if state.config.notifications.strict_decisions {
        if let Err(e) = state.notifier.deliver(&notification).await {
            return Err(InfoCareError::NotificationFailure {
                message: format!(
                    "The association was {} but the family member could not be notified: {}",
                    target.as_str(),
                    e
                ),
                committed: Some(Box::new(view)),
            });
        }
    } else {
        state.notifier.dispatch_detached(notification);
    }

    Ok(view)
}

/// Remove an association. Access it granted is gone on the next read.
pub fn delete(state: &AppState, principal: &Principal, association_id: i64) -> Result<()> {
    let professional_id = principal.require_professional()?;
    state.store.delete_association(association_id)?;
    tracing::info!(association_id, professional_id, "Association deleted");
    Ok(())
}

/// Review queue for professionals, oldest request first
pub fn list(
    state: &AppState,
    principal: &Principal,
    status: Option<AssociationStatus>,
) -> Result<Vec<AssociationView>> {
    principal.require_professional()?;
    Ok(state.store.list_associations(status)?)
}

/// The requester's own associations, newest first
pub fn list_mine(
    state: &AppState,
    principal: &Principal,
    status: Option<AssociationStatus>,
) -> Result<Vec<AssociationView>> {
    let family_member_id = principal.require_family_member()?;
    Ok(state
        .store
        .list_associations_for_family_member(family_member_id, status)?)
}

/// One association; the nested admission appears only once it is approved
pub fn detail(state: &AppState, principal: &Principal, association_id: i64) -> Result<AssociationDetail> {
    let view = state
        .store
        .association_view(association_id)?
        .ok_or_else(|| InfoCareError::not_found("Association", association_id))?;

    let admission = if access::can_view_association_detail(principal, &view.association)? {
        state.store.admission_detail(view.association.admission_id)?
    } else {
        None
    };

    Ok(AssociationDetail { view, admission })
}

fn association_for(state: &AppState, principal: &Principal, admission_id: i64) -> Result<Option<Association>> {
    match principal {
        Principal::Professional { .. } => Ok(None),
        Principal::FamilyMember { id } => Ok(state.store.find_association(*id, admission_id)?),
    }
}

/// Live read-permission check against the persisted association state
pub fn can_read_admission(state: &AppState, principal: &Principal, admission_id: i64) -> Result<bool> {
    let association = association_for(state, principal, admission_id)?;
    let allowed = access::can_read_admission(principal, admission_id, association.as_ref());
    tracing::debug!(principal = %principal, admission_id, allowed, "Access decision");
    Ok(allowed)
}

/// Same as [`can_read_admission`], failing with `Forbidden` on denial
pub fn check_read_admission(state: &AppState, principal: &Principal, admission_id: i64) -> Result<()> {
    let association = association_for(state, principal, admission_id)?;
    access::check_read_admission(principal, admission_id, association.as_ref())
}
