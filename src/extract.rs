//! Extractors that turn malformed requests into structured [Error]s instead
//! of axum's plain-text rejections.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{Error, database_id::DatabaseId};

/// Like [axum::Json], but rejects with [Error::InvalidBody].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(request, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_to_error(rejection)),
        }
    }
}

fn json_rejection_to_error(rejection: JsonRejection) -> Error {
    Error::InvalidBody(rejection.body_text())
}

/// Like [axum::extract::Query], but rejects with [Error::InvalidQuery].
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
    }
}

/// The `{id}` parameter of a route, rejecting with [Error::InvalidRequest]
/// when it is not an integer.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DatabaseId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<DatabaseId>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|rejection| Error::InvalidRequest(rejection.body_text()))
    }
}

/// Parse a request body that may be empty.
///
/// Returns `Ok(None)` for an empty (or whitespace only) body, and
/// [Error::InvalidBody] if a non-empty body is not valid JSON for `T`.
pub fn parse_optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body)
        .map(Some)
        .map_err(|error| Error::InvalidBody(error.to_string()))
}
