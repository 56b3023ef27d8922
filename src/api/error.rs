//! API error responses

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Errors returned by API handlers as `{"error": "..."}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// A required field was missing or empty
    BadRequest(&'static str),
    /// The body was not valid JSON for the endpoint
    InvalidJson,
    /// The responder failed
    Internal,
    /// A handler panicked
    Panicked,
    NotFound,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl ApiError {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::Internal | Self::Panicked => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BadRequest(msg) => msg,
            Self::InvalidJson => "Invalid JSON body",
            Self::Internal => "Internal server error",
            Self::Panicked => "Something went wrong!",
            Self::NotFound => "Route not found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::InvalidJson
    }
}
