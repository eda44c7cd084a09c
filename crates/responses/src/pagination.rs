//! Offset pagination: the paginated envelope and the list filter query.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use basekit_core::{DomainError, DomainResult, Validate, ValidationErrors};

use crate::envelope::{Envelope, PageBody, Payload};
use crate::status::ResponseStatus;

/// Keys owned by [`PaginatedMeta`]; caller-supplied extras with these names
/// are dropped.
const RESERVED_META_KEYS: [&str; 8] = [
    "page",
    "limit",
    "total",
    "totalPages",
    "hasNextPage",
    "hasPreviousPage",
    "nextPage",
    "previousPage",
];

/// Builder input for a paginated envelope.
///
/// `limit` is non-zero by construction, so `totalPages` is always defined.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: NonZeroU64,
    pub total: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: NonZeroU64, total: u64) -> Self {
        Self { page, limit, total }
    }

    /// Rejects `limit == 0` instead of dividing by it.
    pub fn try_new(page: u64, limit: u64, total: u64) -> DomainResult<Self> {
        let limit = NonZeroU64::new(limit).ok_or_else(|| DomainError::validation("limit must be greater than 0"))?;
        Ok(Self::new(page, limit, total))
    }
}

/// `meta` of a paginated envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<u64>,
    /// Caller-supplied fields, minus any that collide with the ones above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaginatedMeta {
    /// Computed fields overwrite colliding `additional` keys. Callers that
    /// expected their own `page`/`total`/... to survive will be surprised.
    pub fn compute(request: PageRequest, additional: Map<String, Value>) -> Self {
        let PageRequest { page, limit, total } = request;
        let total_pages = total.div_ceil(limit.get());
        let has_next_page = page < total_pages;
        let has_previous_page = page > 1;

        let mut extra = additional;
        extra.retain(|key, _| !RESERVED_META_KEYS.contains(&key.as_str()));

        Self {
            page,
            limit: limit.get(),
            total,
            total_pages,
            has_next_page,
            has_previous_page,
            next_page: has_next_page.then(|| page + 1),
            previous_page: has_previous_page.then(|| page - 1),
            extra,
        }
    }
}

impl<T> Envelope<T> {
    /// Success-shaped envelope carrying one page of `data` and its
    /// [`PaginatedMeta`].
    pub fn paginated(
        data: Vec<T>,
        message: impl Into<String>,
        request: PageRequest,
        additional_meta: Map<String, Value>,
    ) -> Self {
        let meta = PaginatedMeta::compute(request, additional_meta);
        Self::new(200, ResponseStatus::Success, message, Payload::Paginated(PageBody { data, meta }))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Common list query: `?page=2&limit=20&search=x&sortBy=createdAt&sortOrder=desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl FilterQuery {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(Self::DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> NonZeroU64 {
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT);
        NonZeroU64::new(limit).unwrap_or(NonZeroU64::MIN)
    }

    /// Rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit().get())
    }

    /// Pair this query with the total row count for [`Envelope::paginated`].
    pub fn page_request(&self, total: u64) -> PageRequest {
        PageRequest::new(self.page(), self.limit(), total)
    }
}

impl Validate for FilterQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(page) = self.page {
            errors.range("page", page, 1, None);
        }
        if let Some(limit) = self.limit {
            errors.range("limit", limit, 1, Some(Self::MAX_LIMIT));
        }
        errors.into_result()
    }
}
