use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use infocare_core::{ErrorKind, InfoCareError, Outcome};
use infocare_store::StoreError;

/// HTTP status for every error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::BlockedAction | ErrorKind::Conflict => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Unauthorized | ErrorKind::UnknownPrincipal => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Duplicate => StatusCode::CONFLICT,
        ErrorKind::NotificationFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalStore => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler error: a domain error rendered as an [`Outcome`] body
#[derive(Debug)]
pub struct ApiError(pub InfoCareError);

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl From<InfoCareError> for ApiError {
    fn from(err: InfoCareError) -> Self {
        ApiError(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind());
        if let InfoCareError::Storage(ref detail) = self.0 {
            tracing::error!(error = %detail, "Storage failure");
        }
        (status, Json(Outcome::from(&self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use infocare_core::AssociationStatus;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorKind::Validation, 400),
            (ErrorKind::BlockedAction, 400),
            (ErrorKind::Conflict, 400),
            (ErrorKind::Unauthorized, 401),
            (ErrorKind::UnknownPrincipal, 401),
            (ErrorKind::Forbidden, 403),
            (ErrorKind::NotFound, 404),
            (ErrorKind::Duplicate, 409),
            (ErrorKind::NotificationFailure, 502),
            (ErrorKind::InternalStore, 500),
        ];
        for (kind, code) in cases {
            assert_eq!(status_for(kind).as_u16(), code, "{:?}", kind);
        }
    }

    #[test]
    fn test_conflict_response() {
        let err = ApiError::from(InfoCareError::duplicate_request(AssociationStatus::Pending));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_is_hidden() {
        let err = ApiError::from(StoreError::Other("disk I/O error at page 42".to_string()));
        assert_eq!(err.kind(), ErrorKind::InternalStore);
        let outcome = Outcome::from(&err.0);
        assert!(!outcome.message.contains("page 42"));
    }
}
