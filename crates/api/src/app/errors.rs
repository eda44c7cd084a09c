//! Failure boundary: every failure leaves the gateway as one error envelope.
//!
//! Handlers and middleware return [`ApiError`]. Its `IntoResponse` does not
//! render anything itself; it parks a [`CaughtFailure`] on the response and
//! [`exception_filter`] (which knows the environment and the request path)
//! turns it into the envelope and logs it.

use std::any::Any;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;

use basekit_auth::{Denial, DenialKind, literals::access};
use basekit_core::ValidationErrors;
use basekit_responses::literals::{keys, messages};
use basekit_responses::{
    ErrorInput, ErrorNormalizer, ExceptionPayload, Failure, HttpException, Severity, log_severity,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpException),

    #[error(transparent)]
    Denied(#[from] Denial),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    /// Anything unexpected. Logged with its cause chain at error level.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn into_caught(self) -> CaughtFailure {
        match self {
            Self::Http(exception) => CaughtFailure::new(exception.into()),
            Self::Denied(denial) => {
                let key = match denial.kind() {
                    DenialKind::AuthenticationRequired | DenialKind::EmailVerificationRequired => access::UNAUTHORIZED,
                    DenialKind::PrincipalMissing | DenialKind::AdminRequired => access::FORBIDDEN,
                };
                let mut errors = Map::new();
                errors.insert("reason".into(), Value::String(denial.reason().as_str().to_string()));
                let exception = HttpException::with_message(denial.http_code(), denial.message()).with_errors(errors);
                CaughtFailure::new(exception.into()).with_message_key(key)
            }
            Self::Validation(errors) => {
                let mut payload = Map::new();
                let messages = errors.to_json_map().into_values().flat_map(|v| match v {
                    Value::Array(items) => items,
                    other => vec![other],
                });
                payload.insert("message".into(), Value::Array(messages.collect()));
                payload.insert("errors".into(), Value::Object(errors.to_json_map()));
                let exception = HttpException::new(400, ExceptionPayload::Object(payload));
                CaughtFailure::new(exception.into()).with_message_key(keys::ERROR_VALIDATION)
            }
            Self::BadRequest(message) => CaughtFailure::new(HttpException::bad_request(message).into()),
            Self::Internal(error) => {
                let error: &(dyn std::error::Error + Send + Sync + 'static) = error.as_ref();
                CaughtFailure::new(Failure::from_std_error(error)).logged()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_caught().into_response()
    }
}

/// A failure waiting for [`exception_filter`].
#[derive(Debug, Clone)]
pub struct CaughtFailure {
    failure: Failure,
    input: ErrorInput,
}

impl CaughtFailure {
    pub fn new(failure: Failure) -> Self {
        // Structured HTTP exceptions are expected; anything else is not.
        let print_logger = !failure.is_http();
        Self {
            failure,
            input: ErrorInput {
                print_logger,
                ..ErrorInput::default()
            },
        }
    }

    pub fn with_message_key(mut self, key: &str) -> Self {
        self.input.message_key = Some(key.to_string());
        self
    }

    /// Force error-level logging.
    pub fn logged(mut self) -> Self {
        self.input.print_logger = true;
        self
    }
}

impl IntoResponse for CaughtFailure {
    fn into_response(self) -> Response {
        // Placeholder status; the filter replaces the whole response.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Renders parked failures through the normalizer and logs them by severity.
pub async fn exception_filter(
    State(normalizer): State<ErrorNormalizer>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let route = req.uri().path().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut response = next.run(req).await;
    let caught = match response.extensions_mut().remove::<CaughtFailure>() {
        Some(caught) => caught,
        // The router answers a known path with the wrong method on its own.
        None if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            CaughtFailure::new(HttpException::with_message(405, format!("Cannot {method} {route}")).into())
                .with_message_key(keys::ERROR_METHOD_NOT_ALLOWED)
        }
        None => return response,
    };

    let envelope = normalizer.normalize(
        &caught.failure,
        ErrorInput {
            path: Some(path.clone()),
            ..caught.input
        },
    );

    match log_severity(envelope.code(), envelope.print_logger()) {
        Some(Severity::Error) => tracing::error!(
            method = %method,
            url = %path,
            status_code = envelope.code(),
            error = envelope.message(),
            stack = caught.failure.stack(),
            "unhandled failure"
        ),
        Some(Severity::Warning) => tracing::warn!(
            method = %method,
            url = %path,
            status_code = envelope.code(),
            error = envelope.message(),
            "client error"
        ),
        None => {}
    }

    let principal = response.extensions_mut().remove::<crate::context::ResolvedPrincipal>();
    let mut rendered = envelope.into_response();
    if let Some(principal) = principal {
        rendered.extensions_mut().insert(principal);
    }
    if let Some(allow) = response.headers_mut().remove(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}

/// Handler for `CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else {
        messages::ERROR_INTERNAL.to_string()
    };
    CaughtFailure::new(Failure::error_with_stack(message.clone(), format!("panicked: {message}")))
        .with_message_key(keys::ERROR_INTERNAL)
        .into_response()
}

/// Fallback for unknown routes.
pub async fn not_found(method: Method, uri: Uri) -> CaughtFailure {
    CaughtFailure::new(HttpException::not_found(format!("Cannot {method} {}", uri.path())).into())
        .with_message_key(keys::ERROR_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        routing::get,
        Router,
    };
    use basekit_auth::AuthReason;
    use basekit_core::AppEnvironment;
    use serde_json::json;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    use super::*;

    async fn kaboom() -> &'static str {
        panic!("kaboom")
    }

    async fn ledger() -> Result<&'static str, ApiError> {
        Err(anyhow::anyhow!("connection reset").context("loading ledger").into())
    }

    async fn forbidden() -> Result<&'static str, ApiError> {
        Err(Denial::new(DenialKind::AdminRequired, AuthReason::InsufficientPermissions).into())
    }

    async fn call(environment: AppEnvironment, path: &str) -> (StatusCode, Value) {
        let (status, _, body) = send(environment, Request::get(path).body(Body::empty()).unwrap()).await;
        (status, body)
    }

    async fn send(environment: AppEnvironment, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let app = Router::new()
            .route("/kaboom", get(kaboom))
            .route("/ledger", get(ledger))
            .route("/forbidden", get(forbidden))
            .fallback(not_found)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(axum::middleware::from_fn_with_state(
                ErrorNormalizer::new(environment),
                exception_filter,
            ));

        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn panics_become_logged_500_envelopes() {
        let (status, body) = call(AppEnvironment::Production, "/kaboom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "kaboom");
        assert_eq!(body["errors"], json!({ "error": "kaboom" }));
        assert_eq!(body["printLogger"], true);
        assert_eq!(body["path"], "/kaboom");
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn internal_errors_expose_cause_chain_only_in_development() {
        let (status, body) = call(AppEnvironment::Development, "/ledger").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "loading ledger");
        assert_eq!(body["stack"], "loading ledger\nCaused by: connection reset");

        let (_, body) = call(AppEnvironment::Staging, "/ledger").await;
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn denials_carry_reason_and_key() {
        let (status, body) = call(AppEnvironment::Production, "/forbidden").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Admin access required");
        assert_eq!(body["messageKey"], "access.forbidden");
        assert_eq!(body["errors"], json!({ "reason": "insufficient_permissions" }));
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let (status, body) = call(AppEnvironment::Production, "/missing?x=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Cannot GET /missing");
        assert_eq!(body["messageKey"], "error.not_found");
        assert_eq!(body["path"], "/missing?x=1");
    }

    #[tokio::test]
    async fn wrong_method_is_a_405_envelope() {
        let req = Request::post("/ledger?x=1").body(Body::empty()).unwrap();
        let (status, headers, body) = send(AppEnvironment::Production, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["code"], 405);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Cannot POST /ledger");
        assert_eq!(body["messageKey"], "error.method_not_allowed");
        assert_eq!(body["path"], "/ledger?x=1");
        assert_eq!(body["printLogger"], false);
        assert!(headers[header::ALLOW].to_str().unwrap().contains("GET"));
    }
}
