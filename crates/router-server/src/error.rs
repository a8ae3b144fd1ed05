//! API error responses.
//!
//! Every per-request failure leaves the gateway as a JSON body with a
//! human-readable `error` field; internal error objects are never serialized
//! to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A client-visible error: an HTTP status and a message.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// The `error` field of the JSON body.
    pub message: String,
}

impl ApiError {
    /// A `400 Bad Request` error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// A `500 Internal Server Error` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_only_carries_the_error_field() {
        let response = ApiError::bad_request("Invalid JSON body").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
