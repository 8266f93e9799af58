use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::Response,
};
use infocare_core::{
    Acknowledgement, FamilyMemberUpdate, InfoCareError, NewFamilyMember, NewProfessional,
    Notification,
};
use infocare_store::Operation;
use std::sync::Arc;

use super::{extract_body, json_response, path_id};
use crate::audit::{self, AuditContext};
use crate::auth::principal_of;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Self-registration of a family member (POST /family-members). Public.
pub async fn register_family_member(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let new: NewFamilyMember = extract_body(request).await?;
    new.validate()?;

    let member = match state.store.insert_family_member(&new) {
        Ok(member) => member,
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Create, "FamilyMember", None, &err, &state.audit);
            return Err(err);
        }
    };

    audit::log_operation_success(&context, Operation::Create, "FamilyMember", member.id, &state.audit);
    state.notifier.dispatch_detached(Notification::welcome(&member));

    Ok(json_response(StatusCode::CREATED, member))
}

/// GET /family-members, professionals only
pub async fn list_family_members(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    principal_of(&request)?.require_professional()?;
    Ok(json_response(StatusCode::OK, state.store.list_family_members()?))
}

/// GET /family-members/{id}, professionals only
pub async fn read_family_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    principal_of(&request)?.require_professional()?;
    let id = path_id("id", &id)?;
    let member = state
        .store
        .get_family_member(id)?
        .ok_or_else(|| InfoCareError::not_found("Family member", id))?;
    Ok(json_response(StatusCode::OK, member))
}

/// GET /family-members/me
pub async fn my_family_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let id = principal_of(&request)?.require_family_member()?;
    let member = state
        .store
        .get_family_member(id)?
        .ok_or_else(|| InfoCareError::not_found("Family member", id))?;
    Ok(json_response(StatusCode::OK, member))
}

/// PUT /family-members/me
pub async fn update_my_family_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let id = principal_of(&request)?.require_family_member()?;

    let update: FamilyMemberUpdate = extract_body(request).await?;
    update.validate()?;

    match state.store.update_family_member(id, &update) {
        Ok(member) => {
            audit::log_operation_success(&context, Operation::Update, "FamilyMember", id, &state.audit);
            Ok(json_response(StatusCode::OK, member))
        }
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Update, "FamilyMember", Some(id), &err, &state.audit);
            Err(err)
        }
    }
}

/// DELETE /family-members/me. Removes the member's associations with them.
pub async fn delete_my_family_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let id = principal_of(&request)?.require_family_member()?;

    if let Err(e) = state.store.delete_family_member(id) {
        let err: ApiError = e.into();
        audit::log_operation_error(&context, Operation::Delete, "FamilyMember", Some(id), &err, &state.audit);
        return Err(err);
    }

    audit::log_operation_success(&context, Operation::Delete, "FamilyMember", id, &state.audit);
    Ok(json_response(
        StatusCode::OK,
        Acknowledgement::new("Family member account deleted."),
    ))
}

/// Self-registration of a professional (POST /professionals). Public.
pub async fn register_professional(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let new: NewProfessional = extract_body(request).await?;
    new.validate()?;

    match state.store.insert_professional(&new) {
        Ok(professional) => {
            audit::log_operation_success(&context, Operation::Create, "Professional", professional.id, &state.audit);
            Ok(json_response(StatusCode::CREATED, professional))
        }
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Create, "Professional", None, &err, &state.audit);
            Err(err)
        }
    }
}

/// GET /professionals/me
pub async fn my_professional_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Response> {
    let id = principal_of(&request)?.require_professional()?;
    let professional = state
        .store
        .get_professional(id)?
        .ok_or_else(|| InfoCareError::not_found("Professional", id))?;
    Ok(json_response(StatusCode::OK, professional))
}
