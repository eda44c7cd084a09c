//! Envelope type and the per-kind constructors.
//!
//! The wire shape is flat: common fields first, then the kind-specific
//! fields of the [`Payload`] variant.
//!
//! ```json
//! { "code": 200, "status": "success", "message": "Service is healthy",
//!   "path": "/health", "timestamp": "2024-01-01T00:00:00.000Z",
//!   "data": { "status": "ok" } }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cursor::CursorMeta;
use crate::pagination::PaginatedMeta;
use crate::status::{CancellationReason, ResponseStatus, TimeoutType};

/// Path reported when the caller does not supply one.
pub const DEFAULT_PATH: &str = "/api";

const OK: u16 = 200;
const INTERNAL_SERVER_ERROR: u16 = 500;

/// A response envelope.
///
/// Fields are private: the only way to obtain one is through a constructor,
/// which keeps `code` and `status` consistent with the payload kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    code: u16,
    status: ResponseStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_key: Option<String>,
    path: String,
    #[serde(serialize_with = "iso::required")]
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    payload: Payload<T>,
}

/// Kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Success(SuccessBody<T>),
    Paginated(PageBody<T>),
    Cursor(CursorBody<T>),
    Partial(PartialBody<T>),
    Error(ErrorBody),
    Warning(WarningBody),
    Info(InfoBody),
    Pending(PendingBody),
    Processing(ProcessingBody),
    Cancelled(CancelledBody),
    Timeout(TimeoutBody),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessBody<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub meta: PaginatedMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorBody<T> {
    pub data: Vec<T>,
    pub meta: CursorMeta,
}

/// Outcome of a batch where some items failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialBody<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub succeeded: u64,
    pub failed: u64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ItemFailure>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub item: Value,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub print_logger: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WarningBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InfoBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion_time: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingBody {
    /// Percent, clamped to 0..=100 on construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CancellationReason>,
    /// Filled with the construction time when left empty.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "iso::optional")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_type: Option<TimeoutType>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_duration: Option<u64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl<T> Envelope<T> {
    pub(crate) fn new(
        code: u16,
        status: ResponseStatus,
        message: impl Into<String>,
        payload: Payload<T>,
    ) -> Self {
        Self {
            code,
            status,
            message: message.into(),
            message_key: None,
            path: DEFAULT_PATH.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// `200 success` carrying `data`.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::new(OK, ResponseStatus::Success, message, Payload::Success(SuccessBody { data }))
    }

    /// `200 partial`: a batch where some items failed.
    pub fn partial(message: impl Into<String>, body: PartialBody<T>) -> Self {
        Self::new(OK, ResponseStatus::Partial, message, Payload::Partial(body))
    }

    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = Some(key.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn message_key(&self) -> Option<&str> {
        self.message_key.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    pub fn into_payload(self) -> Payload<T> {
        self.payload
    }

    pub fn error_body(&self) -> Option<&ErrorBody> {
        match &self.payload {
            Payload::Error(body) => Some(body),
            _ => None,
        }
    }

    /// Whether the boundary handler must log this envelope at error severity
    /// regardless of its code. Always false for non-error kinds.
    pub fn print_logger(&self) -> bool {
        self.error_body().is_some_and(|body| body.print_logger)
    }
}

impl Envelope {
    /// `200 info`.
    pub fn info(message: impl Into<String>, body: InfoBody) -> Self {
        Self::new(OK, ResponseStatus::Info, message, Payload::Info(body))
    }

    /// `200 warning`.
    pub fn warning(message: impl Into<String>, body: WarningBody) -> Self {
        Self::new(OK, ResponseStatus::Warning, message, Payload::Warning(body))
    }

    /// `200 pending`: accepted, not started.
    pub fn pending(message: impl Into<String>, body: PendingBody) -> Self {
        Self::new(OK, ResponseStatus::Pending, message, Payload::Pending(body))
    }

    /// `200 processing`: started, not finished.
    pub fn processing(message: impl Into<String>, mut body: ProcessingBody) -> Self {
        body.progress = body.progress.map(|p| p.min(100));
        Self::new(OK, ResponseStatus::Processing, message, Payload::Processing(body))
    }

    /// `200 cancelled`.
    pub fn cancelled(message: impl Into<String>, mut body: CancelledBody) -> Self {
        let now = Utc::now();
        body.cancelled_at.get_or_insert(now);
        let mut envelope = Self::new(OK, ResponseStatus::Cancelled, message, Payload::Cancelled(body));
        envelope.timestamp = now;
        envelope
    }

    /// `500 timeout`. There is no request deadline mechanism in the gateway,
    /// so timeouts always render as server errors.
    pub fn timeout(message: impl Into<String>, body: TimeoutBody) -> Self {
        Self::new(INTERNAL_SERVER_ERROR, ResponseStatus::Timeout, message, Payload::Timeout(body))
    }

    /// Only the normalizer builds error envelopes.
    pub(crate) fn error(
        code: u16,
        status: ResponseStatus,
        message: impl Into<String>,
        body: ErrorBody,
    ) -> Self {
        Self::new(code, status, message, Payload::Error(body))
    }
}

mod iso {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    use basekit_core::clock::iso8601;

    pub fn required<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&iso8601(at))
    }

    pub fn optional<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => required(at, serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(feature = "axum")]
mod into_response {
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde::Serialize;

    use super::Envelope;

    /// HTTP status mirrors `code`; the body is the JSON envelope.
    impl<T: Serialize> IntoResponse for Envelope<T> {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, axum::Json(self)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;

    /// Serialized envelope with the clock-dependent field removed.
    fn without_timestamp<T: Serialize>(envelope: &Envelope<T>) -> Value {
        let mut value = serde_json::to_value(envelope).unwrap();
        let stamp = value.as_object_mut().unwrap().remove("timestamp").unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp.as_str().unwrap()).is_ok());
        value
    }

    #[test]
    fn health_success_scenario() {
        let envelope = Envelope::success(json!({ "status": "ok" }), "Service is healthy").with_path("/health");

        assert_eq!(
            without_timestamp(&envelope),
            json!({
                "code": 200,
                "status": "success",
                "message": "Service is healthy",
                "path": "/health",
                "data": { "status": "ok" },
            })
        );
    }

    #[test]
    fn path_defaults_to_api_and_key_is_optional() {
        let envelope = Envelope::success(1, "ok");
        assert_eq!(envelope.path(), DEFAULT_PATH);
        assert_eq!(envelope.message_key(), None);

        let keyed = envelope.with_message_key("operation.success");
        assert_eq!(without_timestamp(&keyed)["messageKey"], "operation.success");
    }

    #[test]
    fn timestamp_is_iso_8601_with_millis() {
        let value = serde_json::to_value(Envelope::info("hi", InfoBody::default())).unwrap();
        let stamp = value["timestamp"].as_str().unwrap();
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn builders_are_idempotent_apart_from_timestamp() {
        let make = || {
            Envelope::pending(
                "Queued",
                PendingBody {
                    job_id: Some("job-1".into()),
                    estimated_completion_time: Some(30),
                },
            )
            .with_message_key("job.queued")
        };
        assert_eq!(without_timestamp(&make()), without_timestamp(&make()));
    }

    #[test]
    fn codes_follow_kind() {
        let ok = [
            Envelope::info("i", InfoBody::default()),
            Envelope::warning("w", WarningBody::default()),
            Envelope::pending("p", PendingBody::default()),
            Envelope::processing("p", ProcessingBody::default()),
            Envelope::cancelled("c", CancelledBody::default()),
            Envelope::success(Value::Null, "s"),
            Envelope::partial(
                "p",
                PartialBody {
                    data: None,
                    succeeded: 1,
                    failed: 1,
                    total: 2,
                    errors: None,
                },
            ),
        ];
        for envelope in ok {
            assert_eq!(envelope.code(), 200, "{:?}", envelope.status());
            assert!(!envelope.print_logger());
        }

        let timeout = Envelope::timeout("slow", TimeoutBody::default());
        assert_eq!(timeout.code(), 500);
        assert_eq!(timeout.status(), ResponseStatus::Timeout);
    }

    #[test]
    fn warning_and_info_fields_map_directly() {
        let mut details = Map::new();
        details.insert("field".into(), json!("nickname"));
        let warning = Envelope::warning(
            "Saved with warnings",
            WarningBody {
                warnings: Some(vec!["nickname truncated".into()]),
                details: Some(details),
            },
        );
        let value = without_timestamp(&warning);
        assert_eq!(value["status"], "warning");
        assert_eq!(value["warnings"], json!(["nickname truncated"]));
        assert_eq!(value["details"]["field"], "nickname");

        let mut metadata = Map::new();
        metadata.insert("version".into(), json!("1.0.0"));
        let info = Envelope::info(
            "Backend API",
            InfoBody {
                info: None,
                metadata: Some(metadata),
            },
        );
        let value = without_timestamp(&info);
        assert_eq!(value["metadata"]["version"], "1.0.0");
        assert!(value.get("info").is_none());
    }

    #[test]
    fn partial_lists_item_failures() {
        let envelope = Envelope::partial(
            "Imported with failures",
            PartialBody {
                data: Some(json!(["a"])),
                succeeded: 1,
                failed: 1,
                total: 2,
                errors: Some(vec![ItemFailure {
                    item: json!("b"),
                    error: "duplicate".into(),
                    index: Some(1),
                }]),
            },
        );

        let value = without_timestamp(&envelope);
        assert_eq!(value["status"], "partial");
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["total"], 2);
        assert_eq!(value["errors"], json!([{ "item": "b", "error": "duplicate", "index": 1 }]));
    }

    #[test]
    fn processing_clamps_progress() {
        let envelope = Envelope::processing(
            "Working",
            ProcessingBody {
                progress: Some(250),
                stage: Some("resize".into()),
                current_step_number: Some(2),
                total_steps: Some(3),
                ..Default::default()
            },
        );
        let value = without_timestamp(&envelope);
        assert_eq!(value["progress"], 100);
        assert_eq!(value["stage"], "resize");
        assert_eq!(value["currentStepNumber"], 2);
        assert_eq!(value["totalSteps"], 3);
        assert!(value.get("estimatedTimeRemaining").is_none());
    }

    #[test]
    fn cancelled_defaults_cancelled_at_to_construction_time() {
        let envelope = Envelope::cancelled(
            "Export cancelled",
            CancelledBody {
                reason: Some(CancellationReason::UserRequested),
                cancelled_at: None,
            },
        );
        let Payload::Cancelled(body) = envelope.payload() else {
            panic!("expected cancelled payload");
        };
        assert_eq!(body.cancelled_at, Some(envelope.timestamp()));

        let value = without_timestamp(&envelope);
        assert_eq!(value["reason"], "user_requested");
        assert!(value["cancelledAt"].is_string());
    }

    #[test]
    fn timeout_fields_are_camel_cased() {
        let envelope = Envelope::timeout(
            "Upstream timed out",
            TimeoutBody {
                timeout_type: Some(TimeoutType::ExternalService),
                timeout_duration: Some(30),
                retry_after: Some(60),
            },
        );
        let value = without_timestamp(&envelope);
        assert_eq!(value["code"], 500);
        assert_eq!(value["timeoutType"], "external_service");
        assert_eq!(value["timeoutDuration"], 30);
        assert_eq!(value["retryAfter"], 60);
    }
}
