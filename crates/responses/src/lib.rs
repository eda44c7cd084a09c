//! `basekit-responses`: the canonical response envelope.
//!
//! Every response leaving the gateway is one of a closed set of shapes
//! ([`ResponseStatus`]). Builders here are pure apart from reading the wall
//! clock for `timestamp`; the [`ErrorNormalizer`] is the single place where
//! arbitrary failures become an `error` envelope.

pub mod cursor;
pub mod envelope;
pub mod failure;
pub mod literals;
pub mod pagination;
pub mod status;

pub use cursor::CursorMeta;
pub use envelope::{
    CancelledBody, Envelope, ErrorBody, InfoBody, ItemFailure, PartialBody, Payload, PendingBody,
    ProcessingBody, SuccessBody, TimeoutBody, WarningBody, DEFAULT_PATH,
};
pub use literals::operation_completed;
pub use failure::{ErrorInput, ErrorNormalizer, ExceptionPayload, Failure, HttpException, Severity, log_severity};
pub use pagination::{FilterQuery, PageRequest, PaginatedMeta, SortOrder};
pub use status::{CancellationReason, ResponseStatus, TimeoutType};
