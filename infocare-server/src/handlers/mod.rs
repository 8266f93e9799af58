pub mod admissions;
pub mod associations;
pub mod health;
pub mod patients;
pub mod people;
pub mod progress_notes;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use http_body_util::BodyExt;
use infocare_core::{validation, InfoCareError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Read and deserialize a JSON body
pub async fn extract_body<T: DeserializeOwned>(request: Request) -> ApiResult<T> {
    let bytes = request
        .into_body()
        .collect()
        .await
        .map_err(|e| InfoCareError::validation(format!("Could not read request body: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError(InfoCareError::validation(format!("Invalid request body: {}", e))))
}

/// Parse a positive integer id from a path segment
pub fn path_id(field: &str, raw: &str) -> ApiResult<i64> {
    let value: i64 = raw.parse().map_err(|_| {
        InfoCareError::invalid_fields(vec![infocare_core::FieldIssue::new(
            field,
            "must be a positive integer",
        )])
    })?;
    Ok(validation::path_id(field, value)?)
}

/// `?status=` filter shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// Serialize `body` with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}
