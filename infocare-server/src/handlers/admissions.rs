use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::Response,
};
use infocare_core::{Acknowledgement, AdmissionStatus, AdmissionUpdate, InfoCareError, NewAdmission};
use infocare_store::Operation;
use serde_json::json;
use std::sync::Arc;

use super::{extract_body, json_response, path_id, StatusQuery};
use crate::associations;
use crate::audit::{self, AuditContext};
use crate::auth::principal_of;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Open an admission (POST /admissions), professionals only
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    principal_of(&request)?.require_professional()?;

    let new: NewAdmission = extract_body(request).await?;
    new.validate()?;

    match state.store.insert_admission(&new) {
        Ok(admission) => {
            audit::log_operation_success(&context, Operation::Create, "Admission", admission.id, &state.audit);
            Ok(json_response(StatusCode::CREATED, admission))
        }
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Create, "Admission", None, &err, &state.audit);
            Err(err)
        }
    }
}

/// List admissions (GET /admissions?status=ATIVA|ALTA), newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
    request: Request,
) -> ApiResult<Response> {
    principal_of(&request)?;
    let status = query.status.as_deref().map(AdmissionStatus::parse).transpose()?;
    Ok(json_response(StatusCode::OK, state.store.list_admissions(status)?))
}

/// Full admission detail (GET /admissions/{id}).
///
/// The read policy runs before the existence check, so a family member without
/// an approved association gets 403 whether or not the admission exists.
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let principal = principal_of(&request)?;
    let id = path_id("id", &id)?;

    let result = associations::check_read_admission(&state, &principal, id)
        .map_err(ApiError::from)
        .and_then(|()| {
            state
                .store
                .admission_detail(id)?
                .ok_or_else(|| ApiError(InfoCareError::not_found("Admission", id)))
        });

    match result {
        Ok(detail) => {
            audit::log_operation_success(&context, Operation::Read, "Admission", id, &state.audit);
            Ok(json_response(StatusCode::OK, detail))
        }
        Err(err) => {
            audit::log_operation_error(&context, Operation::Read, "Admission", Some(id), &err, &state.audit);
            Err(err)
        }
    }
}

/// Whether the caller may read an admission (GET /admissions/{id}/access)
pub async fn access(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    let id = path_id("id", &id)?;
    let can_read = associations::can_read_admission(&state, &principal, id)?;
    Ok(json_response(
        StatusCode::OK,
        json!({ "admissionId": id, "canRead": can_read }),
    ))
}

/// Edit clinical fields (PUT /admissions/{id}), professionals only
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    principal_of(&request)?.require_professional()?;
    let id = path_id("id", &id)?;

    let update: AdmissionUpdate = extract_body(request).await?;
    update.validate()?;

    match state.store.update_admission(id, &update) {
        Ok(admission) => {
            audit::log_operation_success(&context, Operation::Update, "Admission", id, &state.audit);
            Ok(json_response(StatusCode::OK, admission))
        }
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Update, "Admission", Some(id), &err, &state.audit);
            Err(err)
        }
    }
}

/// Discharge a patient (PUT /admissions/{id}/discharge). A second discharge is blocked.
pub async fn discharge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    let principal = principal_of(&request)?;
    principal.require_professional()?;
    let id = path_id("id", &id)?;

    match state.store.discharge_admission(id) {
        Ok(admission) => {
            tracing::info!(admission_id = id, principal = %principal, "Patient discharged");
            audit::log_operation_success(&context, Operation::Discharge, "Admission", id, &state.audit);
            Ok(json_response(StatusCode::OK, admission))
        }
        Err(e) => {
            let err: ApiError = e.into();
            audit::log_operation_error(&context, Operation::Discharge, "Admission", Some(id), &err, &state.audit);
            Err(err)
        }
    }
}

/// Remove an admission with its notes and associations (DELETE /admissions/{id})
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let context = AuditContext::from_request(&request);
    principal_of(&request)?.require_professional()?;
    let id = path_id("id", &id)?;

    if let Err(e) = state.store.delete_admission(id) {
        let err: ApiError = e.into();
        audit::log_operation_error(&context, Operation::Delete, "Admission", Some(id), &err, &state.audit);
        return Err(err);
    }

    audit::log_operation_success(&context, Operation::Delete, "Admission", id, &state.audit);
    Ok(json_response(StatusCode::OK, Acknowledgement::new("Admission deleted.")))
}
