use axum::extract::{ConnectInfo, Request};
use infocare_core::Principal;
use infocare_store::{AuditEntry, AuditLog, AuditResult, Operation};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Audit context extracted from HTTP request
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub principal: Option<String>,
    pub client_ip: String,
}

impl AuditContext {
    /// Create audit context without connection info (for testing)
    pub fn new(principal: Option<String>, client_ip: String) -> Self {
        Self { principal, client_ip }
    }

    /// Extract audit context from an Axum request
    pub fn from_request(request: &Request) -> Self {
        let principal = request
            .extensions()
            .get::<Principal>()
            .map(|p| p.to_string());

        Self {
            principal,
            client_ip: client_ip(request),
        }
    }
}

pub fn client_ip<B>(request: &axum::http::Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn spawn_write(
    audit_log: &Arc<Mutex<AuditLog>>,
    context: &AuditContext,
    operation: Operation,
    entity: &'static str,
    entity_id: Option<i64>,
    result: AuditResult,
    error: Option<String>,
) {
    let context = context.clone();
    let audit_log = Arc::clone(audit_log);

    tokio::spawn(async move {
        let audit = audit_log.lock().await;
        let entry = AuditEntry {
            operation,
            entity,
            entity_id,
            principal: context.principal.as_deref(),
            client_ip: Some(&context.client_ip),
            result,
            error_message: error.as_deref(),
        };
        if let Err(e) = audit.log(&entry) {
            tracing::error!("Failed to write audit log to database: {}", e);
        }
    });
}

/// Log a successful operation
pub fn log_operation_success(
    context: &AuditContext,
    operation: Operation,
    entity: &'static str,
    entity_id: i64,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    tracing::info!(
        principal = context.principal.as_deref().unwrap_or("anonymous"),
        client_ip = %context.client_ip,
        operation = operation.as_str(),
        entity = entity,
        entity_id = entity_id,
        status = "success",
        "Audit: {} {}/{}",
        operation.as_str(),
        entity,
        entity_id
    );

    spawn_write(
        audit_log,
        context,
        operation,
        entity,
        Some(entity_id),
        AuditResult::Success,
        None,
    );
}

/// Log a failed or refused operation. Forbidden outcomes are recorded as denials.
pub fn log_operation_error(
    context: &AuditContext,
    operation: Operation,
    entity: &'static str,
    entity_id: Option<i64>,
    error: &crate::error::ApiError,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    let result = if error.kind() == infocare_core::ErrorKind::Forbidden {
        AuditResult::Denied
    } else {
        AuditResult::Error
    };

    tracing::warn!(
        principal = context.principal.as_deref().unwrap_or("anonymous"),
        client_ip = %context.client_ip,
        operation = operation.as_str(),
        entity = entity,
        entity_id = ?entity_id,
        status = result.as_str(),
        kind = error.kind().as_str(),
        "Audit: {} {} failed: {}",
        operation.as_str(),
        entity,
        error
    );

    spawn_write(
        audit_log,
        context,
        operation,
        entity,
        entity_id,
        result,
        Some(error.to_string()),
    );
}

/// Log an authentication attempt
pub fn log_auth_attempt(client_ip: &str, principal: Option<&str>, success: bool) {
    if success {
        tracing::debug!(
            principal = principal.unwrap_or("unknown"),
            client_ip = %client_ip,
            status = "success",
            "Audit: Authentication successful"
        );
    } else {
        tracing::warn!(
            client_ip = %client_ip,
            status = "failed",
            "Audit: Authentication failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use infocare_core::InfoCareError;

    #[test]
    fn test_audit_context_creation() {
        let context = AuditContext::new(Some("profissional/3".to_string()), "192.168.1.1".to_string());
        assert_eq!(context.principal.as_deref(), Some("profissional/3"));
        assert_eq!(context.client_ip, "192.168.1.1");
    }

    #[test]
    fn test_audit_context_from_request() {
        let mut request = Request::new(axum::body::Body::empty());
        request.extensions_mut().insert(Principal::FamilyMember { id: 10 });
        let context = AuditContext::from_request(&request);
        assert_eq!(context.principal.as_deref(), Some("familiar/10"));
        assert_eq!(context.client_ip, "unknown");
    }

    #[tokio::test]
    async fn test_denial_is_recorded() {
        let audit_log = Arc::new(Mutex::new(AuditLog::open(":memory:").unwrap()));
        let context = AuditContext::new(Some("familiar/20".to_string()), "127.0.0.1".to_string());
        let error = ApiError(InfoCareError::Forbidden("Access denied".to_string()));

        log_operation_error(&context, Operation::Read, "Admission", Some(7), &error, &audit_log);

        // The write is spawned; poll until it lands
        for _ in 0..50 {
            let entries = audit_log.lock().await.recent_entries(1).unwrap();
            if let Some(entry) = entries.first() {
                assert_eq!(entry.result, "denied");
                assert_eq!(entry.entity_id, Some(7));
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("audit entry was never written");
    }
}
