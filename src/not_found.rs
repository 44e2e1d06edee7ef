use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ErrorBody;

pub async fn get_404_not_found() -> Response {
    not_found_response()
}

pub fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_owned(),
            details: None,
        }),
    )
        .into_response()
}
