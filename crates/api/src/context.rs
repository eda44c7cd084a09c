use axum::http::Method;

use basekit_core::UserId;
use basekit_observability::CorrelationId;

/// Per-request context, inserted by the request middleware before any
/// handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    method: Method,
    /// Path and query as received, e.g. `/api/users?page=2`.
    path: String,
}

impl RequestContext {
    pub fn new(correlation_id: CorrelationId, method: Method, path: impl Into<String>) -> Self {
        Self {
            correlation_id,
            method,
            path: path.into(),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Set on the response by the auth middleware so the request log line can
/// name the principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedPrincipal(pub UserId);
