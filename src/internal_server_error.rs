//! Responses for unexpected server-side failures.
//!
//! Internal errors never leak their cause to clients. The cause travels with
//! the response as an [InternalErrorDetail] extension so that, in development
//! mode, [attach_error_details] can copy it into the body.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, ErrorBody, config::RuntimeMode};

/// The client-facing message for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The full description of an internal error, attached to the response as an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalErrorDetail(pub String);

/// Log `error` and build a generic 500 response for it.
pub fn internal_server_error_response(error: &Error) -> Response {
    tracing::error!("An unexpected error occurred: {error}");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: INTERNAL_ERROR_MESSAGE.to_owned(),
            details: None,
        }),
    )
        .into_response();

    response
        .extensions_mut()
        .insert(InternalErrorDetail(error.to_string()));

    response
}

/// Copy the cause of an internal error into the response body when running in
/// development mode.
pub async fn attach_error_details(
    State(mode): State<RuntimeMode>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if mode != RuntimeMode::Development {
        return response;
    }

    let Some(InternalErrorDetail(details)) =
        response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let (parts, _) = response.into_parts();

    (
        parts.status,
        Json(ErrorBody {
            error: INTERNAL_ERROR_MESSAGE.to_owned(),
            details: Some(details),
        }),
    )
        .into_response()
}
