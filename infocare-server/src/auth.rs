use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use infocare_core::{ErrorKind, InfoCareError, Outcome, Principal};
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::{audit, config::JwtSettings, error::ApiError, AppState};

/// Bearer token claims.
///
/// `sub` is the numeric id of the family member or professional (a numeric
/// string is accepted too); `tipo` is the role tag.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Value,
    pub tipo: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Routes reachable without a token: health and self-registration
fn is_public(method: &Method, path: &str) -> bool {
    match (method, path) {
        (&Method::GET, "/health") => true,
        (&Method::POST, "/family-members") | (&Method::POST, "/professionals") => true,
        _ => false,
    }
}

/// Authentication middleware
///
/// Resolves the bearer token into a [`Principal`] and stores it in the request
/// extensions. Handlers never see a request without one on protected routes.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if is_public(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let client_ip = audit::client_ip(&request);

    let Some(ref secret) = state.config.auth.jwt.secret else {
        tracing::error!("JWT secret is not configured; refusing authenticated request");
        let outcome = Outcome::new(
            ErrorKind::InternalStore,
            "Authentication is not configured on the server.",
        );
        return Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(outcome)).into_response());
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(auth_header) = auth_header else {
        audit::log_auth_attempt(&client_ip, None, false);
        let outcome = Outcome::unauthorized("Authentication token not provided.");
        return Err((StatusCode::UNAUTHORIZED, axum::Json(outcome)).into_response());
    };

    let Some(token) = auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    else {
        audit::log_auth_attempt(&client_ip, None, false);
        let outcome = Outcome::unauthorized("Malformed token. Use 'Bearer <token>'.");
        return Err((StatusCode::UNAUTHORIZED, axum::Json(outcome)).into_response());
    };

    let principal = match resolve_principal(&state.config.auth.jwt, secret, token) {
        Ok(principal) => principal,
        Err(err) => {
            audit::log_auth_attempt(&client_ip, None, false);
            return Err(ApiError::from(err).into_response());
        }
    };

    audit::log_auth_attempt(&client_ip, Some(&principal.to_string()), true);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Verify an HS256 token and map its claims to a principal
pub fn resolve_principal(
    settings: &JwtSettings,
    secret: &str,
    token: &str,
) -> Result<Principal, InfoCareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(ref issuer) = settings.issuer {
        validation.set_issuer(&[issuer]);
    }
    if let Some(ref audience) = settings.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    let token_data: TokenData<Claims> = jsonwebtoken::decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| InfoCareError::Unauthorized(format!("Invalid token: {}", e)))?;

    let id = subject_id(&token_data.claims.sub).ok_or_else(|| {
        InfoCareError::Unauthorized("Token subject must be a numeric identifier.".to_string())
    })?;

    Principal::from_claims(id, &token_data.claims.tipo)
}

fn subject_id(sub: &Value) -> Option<i64> {
    match sub {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Principal resolved by [`auth_middleware`]
pub fn principal_of(request: &Request) -> Result<Principal, ApiError> {
    request
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or_else(|| {
            ApiError(InfoCareError::Unauthorized(
                "Authentication token not provided.".to_string(),
            ))
        })
}
