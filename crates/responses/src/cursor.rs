//! Cursor-based (keyset) pages.

use serde::{Deserialize, Serialize};

use crate::envelope::{CursorBody, Envelope, Payload};
use crate::status::ResponseStatus;

/// `meta` of a cursor page. Also the builder input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorMeta {
    /// Cursor this page was fetched with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub limit: u64,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Envelope<T> {
    /// Success-shaped envelope with `meta = {cursor, limit, hasMore, nextCursor}`.
    pub fn cursor(data: Vec<T>, message: impl Into<String>, meta: CursorMeta) -> Self {
        Self::new(200, ResponseStatus::Success, message, Payload::Cursor(CursorBody { data, meta }))
    }
}
