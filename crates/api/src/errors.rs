//! Status-carrying errors returned by business functions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use grails_core::{BoxError, augment};

/// An error plus the HTTP status it should be reported with.
///
/// Renders as its wrapped error's text; the status is passed through verbatim.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ResponseError {
    #[source]
    pub error: BoxError,
    pub status: StatusCode,
}

impl ResponseError {
    /// A plain message error with no underlying cause.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            error: message.into(),
            status,
        }
    }

    pub fn from_error(status: StatusCode, error: impl Into<BoxError>) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Build a [`ResponseError`] from a message and an optional cause.
///
/// With a cause the text is `"<message>: <cause>"`, otherwise just `message`.
pub fn augment_with_status(
    message: impl Into<String>,
    cause: Option<BoxError>,
    status: StatusCode,
) -> ResponseError {
    match cause {
        Some(cause) => ResponseError::from_error(status, augment(message, cause)),
        None => ResponseError::new(status, message),
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        (self.status, self.error.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn with_cause_prefixes_message() {
        let err = augment_with_status(
            "error saving item",
            Some("db down".into()),
            StatusCode::SERVICE_UNAVAILABLE,
        );
        assert_eq!(err.to_string(), "error saving item: db down");
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.source().is_some());
    }

    #[test]
    fn without_cause_is_just_the_message() {
        let err = augment_with_status("item not found", None, StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "item not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn status_is_passed_through_verbatim() {
        let teapot = StatusCode::from_u16(418).unwrap();
        let err = ResponseError::new(teapot, "short and stout");
        assert_eq!(err.into_response().status(), teapot);
    }
}
