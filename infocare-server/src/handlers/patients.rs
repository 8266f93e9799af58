use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::Response,
};
use infocare_core::{InfoCareError, NewPatient, PatientContactUpdate};
use std::sync::Arc;

use super::{extract_body, json_response, path_id};
use crate::auth::principal_of;
use crate::error::ApiResult;
use crate::AppState;

/// Register a patient (POST /patients), professionals only
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    principal.require_professional()?;

    let new: NewPatient = extract_body(request).await?;
    new.validate()?;

    let patient = state.store.insert_patient(&new)?;
    tracing::info!(patient_id = patient.id, principal = %principal, "Patient registered");
    Ok(json_response(StatusCode::CREATED, patient))
}

/// List patients (GET /patients)
pub async fn list(State(state): State<Arc<AppState>>, request: Request) -> ApiResult<Response> {
    principal_of(&request)?;
    Ok(json_response(StatusCode::OK, state.store.list_patients()?))
}

/// Read one patient (GET /patients/{id})
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    principal_of(&request)?;
    let id = path_id("id", &id)?;
    let patient = state
        .store
        .get_patient(id)?
        .ok_or_else(|| InfoCareError::not_found("Patient", id))?;
    Ok(json_response(StatusCode::OK, patient))
}

/// Change a patient's contact phone (PUT /patients/{id}), professionals only
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let principal = principal_of(&request)?;
    principal.require_professional()?;
    let id = path_id("id", &id)?;

    let update: PatientContactUpdate = extract_body(request).await?;
    update.validate()?;
    let phone = update.phone.as_deref().unwrap_or_default();

    let patient = state.store.update_patient_phone(id, phone)?;
    tracing::info!(patient_id = id, principal = %principal, "Patient contact updated");
    Ok(json_response(StatusCode::OK, patient))
}
