use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;

use basekit_auth::{RouteAuth, TokenVerifier, authorize};
use basekit_observability::{CORRELATION_HEADER, CorrelationId};

use crate::app::errors::ApiError;
use crate::context::{RequestContext, ResolvedPrincipal};

/// Outermost request middleware: correlation id, `request` span, start and
/// completion log lines, and the correlation header on the response.
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let correlation_id = CorrelationId::from_header(
        req.headers()
            .get(CORRELATION_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let method = req.method().clone();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    req.extensions_mut()
        .insert(RequestContext::new(correlation_id.clone(), method.clone(), path.clone()));

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation_id,
        method = %method,
        uri = %path,
    );

    async move {
        let started = Instant::now();
        tracing::info!("incoming request");

        let mut response = next.run(req).await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let user_id = response
            .extensions()
            .get::<ResolvedPrincipal>()
            .map(|p| p.0.to_string());
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            user_id = user_id.as_deref(),
            "request completed"
        );

        if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
            response.headers_mut().insert(CORRELATION_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub route: RouteAuth,
}

impl AuthState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, route: RouteAuth) -> Self {
        Self { verifier, route }
    }
}

/// Runs the auth decision for a route group. On allow, the principal is
/// placed in the request extensions for handlers.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_bearer(req.headers());
    let access = authorize(state.route, credential, state.verifier.as_ref(), Utc::now())?;

    let principal = access.into_principal();
    if let Some(user) = &principal {
        req.extensions_mut().insert(user.clone());
    }

    let mut response = next.run(req).await;
    if let Some(user) = principal {
        response.extensions_mut().insert(ResolvedPrincipal(user.id));
    }
    Ok(response)
}

/// `Authorization: Bearer <token>`; anything else counts as no credential.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
