//! Request extractors that report failures as error envelopes.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use basekit_core::Validate;
use basekit_responses::FilterQuery;

use crate::app::errors::ApiError;
use crate::context::RequestContext;

/// JSON body that has been deserialized and validated.
///
/// Malformed JSON becomes a 400 with the parser's message; constraint
/// violations become a 400 listing every field.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// `?page=&limit=&search=&sortBy=&sortOrder=`, validated.
#[derive(Debug, Clone)]
pub struct Pagination(pub FilterQuery);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<FilterQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        query.validate()?;
        Ok(Self(query))
    }
}

/// Path and query of the current request, as reported in envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestPath
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = match parts.extensions.get::<RequestContext>() {
            Some(context) => context.path().to_string(),
            None => parts
                .uri
                .path_and_query()
                .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string()),
        };
        Ok(Self(path))
    }
}
