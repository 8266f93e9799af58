use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::Response,
};
use infocare_core::{
    association::parse_status_filter, Acknowledgement, Decision, InfoCareError, NewAssociation,
};
use infocare_store::Operation;
use std::sync::Arc;

use super::{extract_body, json_response, path_id, StatusQuery};
use crate::associations;
use crate::audit::{self, AuditContext};
use crate::auth::principal_of;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request access to an admission (POST /associations), family members only
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let principal = principal_of(&request)?;
    if let Err(e) = principal.require_family_member() {
        let err = ApiError::from(e);
        audit::log_operation_error(&context, Operation::Create, "Association", None, &err, &state.audit);
        return Err(err);
    }
    let new: NewAssociation = extract_body(request).await?;

    match associations::create(&state, &principal, &new) {
        Ok(view) => {
            audit::log_operation_success(&context, Operation::Create, "Association", view.association.id, &state.audit);
            Ok(json_response(StatusCode::CREATED, view))
        }
        Err(e) => {
            let err = ApiError::from(e);
            audit::log_operation_error(&context, Operation::Create, "Association", None, &err, &state.audit);
            Err(err)
        }
    }
}

/// Review queue (GET /associations?status=pendente|aprovada|rejeitada), professionals only
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
    request: Request,
) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    principal.require_professional()?;
    let status = parse_status_filter(query.status.as_deref())?;
    let views = associations::list(&state, &principal, status)?;
    Ok(json_response(StatusCode::OK, views))
}

/// The caller's own requests (GET /associations/mine)
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
    request: Request,
) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    principal.require_family_member()?;
    let status = parse_status_filter(query.status.as_deref())?;
    let views = associations::list_mine(&state, &principal, status)?;
    Ok(json_response(StatusCode::OK, views))
}

/// GET /associations/{id}
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    let id = path_id("id", &id)?;
    let detail = associations::detail(&state, &principal, id)?;
    Ok(json_response(StatusCode::OK, detail))
}

/// PUT /associations/{id}/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    decide(state, id, request, Decision::Approve).await
}

/// PUT /associations/{id}/reject
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    decide(state, id, request, Decision::Reject).await
}

async fn decide(
    state: Arc<AppState>,
    raw_id: String,
    request: Request,
    decision: Decision,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let principal = principal_of(&request)?;
    let operation = match decision {
        Decision::Approve => Operation::Approve,
        Decision::Reject => Operation::Reject,
    };
    if let Err(e) = principal.require_professional() {
        let err = ApiError::from(e);
        audit::log_operation_error(&context, operation, "Association", None, &err, &state.audit);
        return Err(err);
    }
    let id = path_id("id", &raw_id)?;

    match associations::decide(&state, &principal, id, decision).await {
        Ok(view) => {
            audit::log_operation_success(&context, operation, "Association", id, &state.audit);
            Ok(json_response(StatusCode::OK, view))
        }
        // The new status is stored; only the notice to the family member failed
        Err(e @ InfoCareError::NotificationFailure { .. }) => {
            audit::log_operation_success(&context, operation, "Association", id, &state.audit);
            tracing::warn!(
                association_id = id,
                decision = decision.as_str(),
                "Decision committed without notifying the family member: {}",
                e
            );
            Err(ApiError::from(e))
        }
        Err(e) => {
            let err = ApiError::from(e);
            audit::log_operation_error(&context, operation, "Association", Some(id), &err, &state.audit);
            Err(err)
        }
    }
}

/// Revoke an association (DELETE /associations/{id}), professionals only
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let principal = principal_of(&request)?;
    if let Err(e) = principal.require_professional() {
        let err = ApiError::from(e);
        audit::log_operation_error(&context, Operation::Delete, "Association", None, &err, &state.audit);
        return Err(err);
    }
    let id = path_id("id", &id)?;

    if let Err(e) = associations::delete(&state, &principal, id) {
        let err = ApiError::from(e);
        audit::log_operation_error(&context, Operation::Delete, "Association", Some(id), &err, &state.audit);
        return Err(err);
    }

    audit::log_operation_success(&context, Operation::Delete, "Association", id, &state.audit);
    Ok(json_response(StatusCode::OK, Acknowledgement::new("Association deleted.")))
}
