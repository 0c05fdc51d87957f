//! Value → JSON adapter.
//!
//! Business functions return `Result<Reply<T>, ResponseError>`; the adapter
//! turns that into a plain request handler.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::errors::ResponseError;
use crate::handler::{BoxHandler, HandlerFuture};

/// Successful outcome of a business function.
#[derive(Debug)]
pub enum Reply<T> {
    /// Serialize the value as the response body.
    Json(T),
    /// The function built its own response; pass it through untouched.
    Handled(Response),
}

impl<T> Reply<T> {
    /// An empty `200 OK`, for functions with nothing to return.
    pub fn empty() -> Self {
        Self::Handled(StatusCode::OK.into_response())
    }
}

/// Lift a business function into a request handler.
///
/// - `Err(e)`: body is `e`'s text, status is `e.status`; the text is logged.
/// - `Ok(Reply::Handled(r))`: `r` is returned as is.
/// - `Ok(Reply::Json(v))`: body is exactly `serde_json::to_vec(&v)`, no
///   `Content-Type` is set. A serialization failure becomes a `500`.
pub fn handle_with_error<F, Fut, T>(f: F) -> BoxHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply<T>, ResponseError>> + Send + 'static,
    T: Serialize + 'static,
{
    Arc::new(move |req: Request| -> HandlerFuture {
        let fut = f(req);
        Box::pin(async move { respond(fut.await) })
    })
}

/// Render the outcome of a business function.
pub fn respond<T: Serialize>(result: Result<Reply<T>, ResponseError>) -> Response {
    match result {
        Err(err) => {
            tracing::error!(status = err.status.as_u16(), error = %err, "handler failed");
            err.into_response()
        }
        Ok(Reply::Handled(response)) => response,
        Ok(Reply::Json(value)) => match serde_json::to_vec(&value) {
            Ok(bytes) => Response::new(Body::from(bytes)),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;
    use serde_json::json;

    use super::*;

    async fn call(handler: BoxHandler) -> (StatusCode, Option<String>, String) {
        let res = handler(Request::new(Body::empty())).await;
        let status = res.status();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn value_is_written_as_exact_json_bytes() {
        let handler = handle_with_error(|_req| async {
            Ok::<_, ResponseError>(Reply::Json(json!({ "ok": true })))
        });

        let (status, content_type, body) = call(handler).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, None);
        assert_eq!(body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn error_writes_text_and_carried_status() {
        let handler = handle_with_error(|_req| async {
            Err::<Reply<()>, _>(ResponseError::new(StatusCode::SERVICE_UNAVAILABLE, "db down"))
        });

        let (status, _, body) = call(handler).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "db down");
    }

    #[tokio::test]
    async fn handled_response_passes_through() {
        let handler = handle_with_error(|_req| async {
            Ok::<Reply<()>, ResponseError>(Reply::Handled(
                (StatusCode::CREATED, [("x-written-by", "handler")], "made it").into_response(),
            ))
        });

        let res = handler(Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["x-written-by"], "handler");
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"made it");
    }

    #[tokio::test]
    async fn empty_reply_is_bare_ok() {
        let handler = handle_with_error(|_req| async { Ok::<Reply<()>, ResponseError>(Reply::empty()) });

        let (status, _, body) = call(handler).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn serialization_failure_is_internal_error() {
        let handler = handle_with_error(|_req| async {
            // Non-string map keys cannot be represented in JSON.
            let mut map = HashMap::new();
            map.insert((1u8, 2u8), "x");
            Ok::<_, ResponseError>(Reply::Json(map))
        });

        let (status, _, body) = call(handler).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("key must be a string"), "unexpected body: {body}");
    }

    #[tokio::test]
    async fn request_reaches_the_business_function() {
        let handler = handle_with_error(|req: Request| async move {
            Ok::<_, ResponseError>(Reply::Json(req.uri().path().to_string()))
        });

        let req = axum::http::Request::builder()
            .uri("/api/items")
            .body(Body::empty())
            .unwrap();
        let res = handler(req).await;
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#""/api/items""#);
    }
}
