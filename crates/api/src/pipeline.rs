//! Outer middleware applied to every mounted route.
//!
//! Middleware is applied in declaration order, so the last one added runs
//! first on the way in. CORS is kept apart from the list and always applied
//! last: it must see a request before anything else does.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, Route};
use tower::{Layer, Service};

use crate::cors::{AllowedOrigins, cors_middleware};

type Wrap = Arc<dyn Fn(MethodRouter) -> MethodRouter + Send + Sync>;

#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Wrap>,
    cors: Option<Arc<AllowedOrigins>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tower layer.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request, Error = Infallible> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.middleware
            .push(Arc::new(move |route: MethodRouter| route.layer(layer.clone())));
        self
    }

    /// Enable the CORS gate. It becomes the outermost middleware regardless of
    /// when this is called.
    pub fn cors(mut self, origins: AllowedOrigins) -> Self {
        self.cors = Some(Arc::new(origins));
        self
    }

    pub fn has_cors(&self) -> bool {
        self.cors.is_some()
    }

    pub fn len(&self) -> usize {
        self.middleware.len() + usize::from(self.cors.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap `route` with every middleware, innermost first, CORS outermost.
    pub fn apply(&self, route: MethodRouter) -> MethodRouter {
        let route = self.middleware.iter().fold(route, |route, wrap| wrap(route));
        match &self.cors {
            Some(origins) => route.layer(axum::middleware::from_fn_with_state(
                origins.clone(),
                cors_middleware,
            )),
            None => route,
        }
    }
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware.len())
            .field("cors", &self.cors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::header::ORIGIN;
    use axum::http::StatusCode;
    use axum::middleware::{Next, from_fn};
    use axum::response::Response;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    type Trail = Arc<Mutex<Vec<&'static str>>>;

    async fn record(trail: Trail, name: &'static str, req: Request, next: Next) -> Response {
        trail.lock().unwrap().push(name);
        next.run(req).await
    }

    fn app(pipeline: &Pipeline, trail: Trail) -> Router {
        let handler_trail = trail.clone();
        let route = get(move || {
            let trail = handler_trail.clone();
            async move {
                trail.lock().unwrap().push("handler");
                "ok"
            }
        });
        Router::new().route("/", pipeline.apply(route))
    }

    fn pipeline_with(trail: &Trail) -> Pipeline {
        let first = trail.clone();
        let second = trail.clone();
        Pipeline::new()
            .cors(AllowedOrigins::parse("https://allowed.example"))
            .layer(from_fn(move |req: Request, next: Next| {
                record(first.clone(), "first", req, next)
            }))
            .layer(from_fn(move |req: Request, next: Next| {
                record(second.clone(), "second", req, next)
            }))
    }

    #[tokio::test]
    async fn later_middleware_runs_first_on_the_way_in() {
        let trail = Trail::default();
        let pipeline = pipeline_with(&trail);
        assert_eq!(pipeline.len(), 3);

        let res = app(&pipeline, trail.clone())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(ORIGIN, "https://allowed.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trail.lock().unwrap(), vec!["second", "first", "handler"]);
    }

    #[tokio::test]
    async fn cors_runs_before_all_other_middleware() {
        let trail = Trail::default();
        let pipeline = pipeline_with(&trail);

        let res = app(&pipeline, trail.clone())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Invalid Origin");
        assert!(trail.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_pipeline_leaves_route_untouched() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert!(!pipeline.has_cors());

        let trail = Trail::default();
        let res = app(&pipeline, trail.clone())
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trail.lock().unwrap(), vec!["handler"]);
    }
}
