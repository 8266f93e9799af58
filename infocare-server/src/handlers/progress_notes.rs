use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::Response,
};
use infocare_core::{Acknowledgement, NewProgressNote, Notification};
use infocare_store::Operation;
use std::sync::Arc;

use super::{extract_body, json_response, path_id};
use crate::audit::{self, AuditContext};
use crate::auth::principal_of;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Record a progress note (POST /progress-notes).
///
/// Only ACTIVE admissions accept notes. Family members with an approved
/// association are told a new note exists; delivery is detached.
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let professional_id = principal_of(&request)?.require_professional()?;

    let new: NewProgressNote = extract_body(request).await?;
    new.validate()?;

    let note = match state
        .store
        .create_progress_note(new.admission_id, professional_id, &new.description)
    {
        Ok(note) => note,
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Create, "ProgressNote", None, &err, &state.audit);
            return Err(err);
        }
    };
    audit::log_operation_success(&context, Operation::Create, "ProgressNote", note.id, &state.audit);

    match state.store.approved_associations(new.admission_id) {
        Ok(followers) => {
            tracing::debug!(admission_id = new.admission_id, followers = followers.len(), "Notifying followers");
            for view in followers {
                state.notifier.dispatch_detached(Notification::progress_note_added(
                    &view.family_member_name,
                    &view.family_member_email,
                    &view.patient_name,
                ));
            }
        }
        Err(e) => tracing::warn!(admission_id = new.admission_id, "Could not load followers: {}", e),
    }

    Ok(json_response(StatusCode::CREATED, note))
}

/// DELETE /progress-notes/{id}, professionals only
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    principal_of(&request)?.require_professional()?;
    let id = path_id("id", &id)?;

    if let Err(e) = state.store.delete_progress_note(id) {
        let err: ApiError = e.into();
        audit::log_operation_error(&context, Operation::Delete, "ProgressNote", Some(id), &err, &state.audit);
        return Err(err);
    }

    audit::log_operation_success(&context, Operation::Delete, "ProgressNote", id, &state.audit);
    Ok(json_response(StatusCode::OK, Acknowledgement::new("Progress note deleted.")))
}
