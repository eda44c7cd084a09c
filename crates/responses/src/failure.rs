//! Error normalization: any caught failure becomes exactly one `error`
//! envelope.

use serde::Serialize;
use serde_json::{Map, Value};

use basekit_core::AppEnvironment;

use crate::envelope::{Envelope, ErrorBody};
use crate::status::ResponseStatus;

const DEFAULT_CODE: u16 = 500;
const DEFAULT_MESSAGE: &str = "An error occurred";

/// Payload of an [`HttpException`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExceptionPayload {
    Text(String),
    Object(Map<String, Value>),
}

/// A failure that already knows its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpException {
    status: u16,
    payload: ExceptionPayload,
}

impl HttpException {
    pub fn new(status: u16, payload: ExceptionPayload) -> Self {
        Self { status, payload }
    }

    /// Object payload `{ "message": message }`.
    pub fn with_message(status: u16, message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".into(), Value::String(message.into()));
        Self::new(status, ExceptionPayload::Object(payload))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(404, message)
    }

    /// Attach an `errors` map. A text payload is promoted to an object.
    pub fn with_errors(self, errors: Map<String, Value>) -> Self {
        let mut object = match self.payload {
            ExceptionPayload::Object(object) => object,
            ExceptionPayload::Text(text) => {
                let mut object = Map::new();
                object.insert("message".into(), Value::String(text));
                object
            }
        };
        object.insert("errors".into(), Value::Object(errors));
        Self::new(self.status, ExceptionPayload::Object(object))
    }

    /// Re-raise an envelope that was already built further down the call
    /// stack. Its `printLogger` preference survives normalization.
    pub fn from_envelope<T>(envelope: &Envelope<T>) -> Self {
        let mut object = Map::new();
        object.insert("message".into(), Value::String(envelope.message().to_string()));
        if let Some(body) = envelope.error_body() {
            if let Some(errors) = &body.errors {
                object.insert("errors".into(), Value::Object(errors.clone()));
            }
            object.insert("printLogger".into(), Value::Bool(body.print_logger));
        }
        Self::new(envelope.code(), ExceptionPayload::Object(object))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn payload(&self) -> &ExceptionPayload {
        &self.payload
    }
}

impl core::fmt::Display for HttpException {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match &self.payload {
            ExceptionPayload::Text(text) => Some(text.as_str()),
            ExceptionPayload::Object(object) => object.get("message").and_then(Value::as_str),
        };
        write!(f, "HTTP {}: {}", self.status, message.unwrap_or(DEFAULT_MESSAGE))
    }
}

impl std::error::Error for HttpException {}

/// Anything that can reach the request boundary as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Structured HTTP exception.
    Http(HttpException),
    /// Generic error carrying a message and, possibly, diagnostics.
    Error { message: String, stack: Option<String> },
    /// Arbitrary structured value; becomes the `errors` payload.
    Object(Map<String, Value>),
    /// Nothing usable (null, primitives, a panic without a message).
    Opaque,
}

impl Failure {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            stack: None,
        }
    }

    pub fn error_with_stack(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            stack: Some(stack.into()),
        }
    }

    /// Message from `Display`, stack from the `source()` chain.
    pub fn from_std_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let mut stack = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str("\nCaused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::error_with_stack(error.to_string(), stack)
    }

    /// Classify an untyped JSON value the way the normalizer's cascade
    /// expects: objects become `Object`, strings become an `Error`, anything
    /// else is `Opaque`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(object) => Self::Object(object),
            Value::String(message) => Self::error(message),
            _ => Self::Opaque,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Error { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }
}

impl From<HttpException> for Failure {
    fn from(value: HttpException) -> Self {
        Self::Http(value)
    }
}

/// Caller overrides for [`ErrorNormalizer::normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorInput {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub message_key: Option<String>,
    pub errors: Option<Map<String, Value>>,
    pub path: Option<String>,
    pub print_logger: bool,
}

/// Builds error envelopes. The environment is fixed at startup and only
/// decides whether stacks are rendered.
#[derive(Debug, Clone, Copy)]
pub struct ErrorNormalizer {
    environment: AppEnvironment,
}

impl ErrorNormalizer {
    pub fn new(environment: AppEnvironment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// First matching rule wins:
    /// 1. HTTP exception: its status, `unauthorized` on 401, message/errors
    ///    and an inherited `printLogger` from an object payload.
    /// 2. Generic error: its message; `errors = {error: message}` unless the
    ///    caller supplied errors.
    /// 3. Structured value: becomes `errors`.
    /// 4. Otherwise the caller's values or `500 "An error occurred"`.
    ///
    /// Never fails.
    pub fn normalize(&self, failure: &Failure, input: ErrorInput) -> Envelope {
        let ErrorInput {
            code,
            message,
            message_key,
            errors,
            path,
            print_logger,
        } = input;

        let mut code = code.unwrap_or(DEFAULT_CODE);
        let mut message = message.filter(|m| !m.is_empty()).unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        let mut status = ResponseStatus::Error;
        let mut errors = errors;
        let mut print_logger = print_logger;

        match failure {
            Failure::Http(exception) => {
                code = exception.status();
                if code == 401 {
                    status = ResponseStatus::Unauthorized;
                }
                match exception.payload() {
                    ExceptionPayload::Object(object) => {
                        if let Some(text) = message_from(object.get("message")) {
                            message = text;
                        }
                        errors = object.get("errors").and_then(Value::as_object).cloned();
                        if let Some(inherited) = object.get("printLogger").and_then(Value::as_bool) {
                            print_logger = inherited;
                        }
                    }
                    ExceptionPayload::Text(text) => message = text.clone(),
                }
            }
            Failure::Error { message: text, .. } => {
                if !text.is_empty() {
                    message = text.clone();
                }
                if errors.is_none() {
                    let mut synthesized = Map::new();
                    synthesized.insert("error".into(), Value::String(text.clone()));
                    errors = Some(synthesized);
                }
            }
            Failure::Object(object) => errors = Some(object.clone()),
            Failure::Opaque => {}
        }

        let stack = failure
            .stack()
            .filter(|_| self.environment.exposes_stack_traces())
            .map(str::to_string);

        let mut envelope = Envelope::error(
            code,
            status,
            message,
            ErrorBody {
                errors,
                stack,
                print_logger,
            },
        );
        if let Some(key) = message_key {
            envelope = envelope.with_message_key(key);
        }
        if let Some(path) = path {
            envelope = envelope.with_path(path);
        }
        envelope
    }
}

/// A string message is taken as-is; a list of messages (one per violated
/// constraint) is joined.
fn message_from(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

/// Log level the boundary uses for a normalized failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    /// With stack, when one is available.
    Error,
    /// Without stack.
    Warning,
}

/// `printLogger` or a 5xx code means error; other 4xx codes mean warning;
/// anything below 400 is not logged.
pub fn log_severity(code: u16, print_logger: bool) -> Option<Severity> {
    if print_logger || code >= 500 {
        Some(Severity::Error)
    } else if code >= 400 {
        Some(Severity::Warning)
    } else {
        None
    }
}
