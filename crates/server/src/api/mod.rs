//! HTTP handlers.
//!
//! Error responses share one JSON shape, `{ "error": "..." }`, paired with
//! the status code.

mod health;
mod images;

pub use health::{health, HealthResponse};
pub use images::{get_image, post_image, post_images, PathRequest, PathsRequest};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn error_response(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: msg.into() }))
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, msg)
}

pub(crate) fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
