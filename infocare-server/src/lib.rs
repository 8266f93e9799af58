//! infocare - ward records and family access service
//!
//! Patients, admissions and progress notes, plus the workflow through which
//! family members request and receive read access to a relative's admission.

pub mod associations;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;

use axum::{
    http::{Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use infocare_store::{AuditLog, SqliteStore};
use notify::Notifier;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state
pub struct AppState {
    pub store: SqliteStore,
    pub audit: Arc<Mutex<AuditLog>>,
    pub config: config::ServerConfig,
    pub notifier: Notifier,
}

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let timeout = state.config.request_timeout();
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Patients
        .route(
            "/patients",
            get(handlers::patients::list).post(handlers::patients::create),
        )
        .route(
            "/patients/{id}",
            get(handlers::patients::read).put(handlers::patients::update_contact),
        )
        // Family members
        .route(
            "/family-members",
            get(handlers::people::list_family_members).post(handlers::people::register_family_member),
        )
        .route(
            "/family-members/me",
            get(handlers::people::my_family_profile)
                .put(handlers::people::update_my_family_profile)
                .delete(handlers::people::delete_my_family_profile),
        )
        .route("/family-members/{id}", get(handlers::people::read_family_member))
        // Professionals
        .route("/professionals", post(handlers::people::register_professional))
        .route("/professionals/me", get(handlers::people::my_professional_profile))
        // Admissions
        .route(
            "/admissions",
            get(handlers::admissions::list).post(handlers::admissions::create),
        )
        .route(
            "/admissions/{id}",
            get(handlers::admissions::read)
                .put(handlers::admissions::update)
                .delete(handlers::admissions::delete),
        )
        .route("/admissions/{id}/discharge", put(handlers::admissions::discharge))
        .route("/admissions/{id}/access", get(handlers::admissions::access))
        // Progress notes
        .route("/progress-notes", post(handlers::progress_notes::create))
        .route(
            "/progress-notes/{id}",
            axum::routing::delete(handlers::progress_notes::delete),
        )
        // Associations
        .route("/associations/mine", get(handlers::associations::list_mine))
        .route(
            "/associations",
            get(handlers::associations::list).post(handlers::associations::create),
        )
        .route(
            "/associations/{id}",
            get(handlers::associations::read).delete(handlers::associations::delete),
        )
        .route("/associations/{id}/approve", put(handlers::associations::approve))
        .route("/associations/{id}/reject", put(handlers::associations::reject))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn state(dir: &tempfile::TempDir, secret: Option<&str>) -> Arc<AppState> {
        let mut config = config::ServerConfig::default();
        config.auth.jwt.secret = secret.map(str::to_string);
        Arc::new(AppState {
            store: SqliteStore::open(dir.path().join("infocare.sqlite")).unwrap(),
            audit: Arc::new(Mutex::new(AuditLog::open(dir.path().join("audit.sqlite")).unwrap())),
            config,
            notifier: Notifier::new(Arc::new(notify::DisabledSink)),
        })
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = build_router(state(&dir, None));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_secret_refuses_protected_routes() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = build_router(state(&dir, None));

        let response = app
            .oneshot(Request::get("/admissions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = state(&dir, Some("secret"));
        let limit = state.config.server.max_body_bytes;
        let app = build_router(state);

        let body = format!("{{\"name\":\"{}\"}}", "x".repeat(limit + 1));
        let response = app
            .oneshot(
                Request::post("/family-members")
                    .header("content-type", "application/json")
                    .header("content-length", body.len().to_string())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let _ = response.into_body().collect().await;
    }
}
