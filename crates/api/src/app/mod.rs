//! Router assembly.
//!
//! - `routes/`: the services this binary ships with
//! - `services.rs`: infrastructure wiring (store-backed user resolver)

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter, on};
use axum::{Extension, Router};
use sqlx::PgPool;
use thiserror::Error;

use grails_auth::TokenCodec;

use crate::config::AppConfig;
use crate::handler::{Access, HandlerDescriptor};
use crate::middleware::{Authenticator, RouteGuard, auth_middleware};
use crate::pipeline::Pipeline;
use crate::service::{Service, route_path};

pub mod routes;
pub mod services;

/// Fatal errors while registering services.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("setup failed for service '{prefix}': {source}")]
    Setup {
        prefix: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("protected route {path} has no allowed roles")]
    NoRoles { path: String },

    #[error("route {path} is registered more than once")]
    DuplicateRoute { path: String },

    #[error("route {path} declares unsupported method {method}")]
    UnsupportedMethod { path: String, method: Method },
}

/// Set up every service and mount its handlers.
///
/// Services are set up in the order given; the first setup failure aborts
/// registration. Each handler is wrapped with the auth guard when protected,
/// then with the pipeline, and accepts OPTIONS on top of its declared methods.
/// The store is attached to every request as an [`Extension`].
pub async fn create_router<D>(
    store: D,
    authenticator: Arc<Authenticator<D>>,
    services: Vec<Service<D>>,
    pipeline: &Pipeline,
) -> Result<Router, StartupError>
where
    D: Clone + Send + Sync + 'static,
{
    let mut router = Router::new();
    let mut mounted = HashSet::new();

    for service in services {
        let (prefix, setup, handlers) = service.into_parts();

        if let Some(setup) = setup {
            setup(store.clone())
                .await
                .map_err(|source| StartupError::Setup {
                    prefix: prefix.clone(),
                    source,
                })?;
        }

        // Sorted only so startup logs are stable; mounting is order-independent.
        let mut handlers: Vec<_> = handlers.into_iter().collect();
        handlers.sort_by(|a, b| a.0.cmp(&b.0));

        for (sub_path, descriptor) in handlers {
            let path = route_path(&prefix, &sub_path);
            if !mounted.insert(route_shape(&path)) {
                return Err(StartupError::DuplicateRoute { path });
            }

            let route = compose(&path, &descriptor, &store, &authenticator, pipeline)?;
            tracing::info!(
                path = %path,
                methods = ?descriptor.methods(),
                protected = descriptor.is_protected(),
                "mounted route"
            );
            router = router.route(&path, route);
        }
    }

    Ok(router.layer(Extension(store)))
}

fn compose<D>(
    path: &str,
    descriptor: &HandlerDescriptor,
    store: &D,
    authenticator: &Arc<Authenticator<D>>,
    pipeline: &Pipeline,
) -> Result<MethodRouter, StartupError>
where
    D: Clone + Send + Sync + 'static,
{
    let filter = method_filter(path, descriptor.methods())?;
    let handler = descriptor.handler().clone();
    let mut route = on(filter, move |req: Request| handler(req));

    if let Access::Protected(roles) = descriptor.access() {
        if roles.is_empty() {
            return Err(StartupError::NoRoles {
                path: path.to_string(),
            });
        }
        let guard = RouteGuard::new(store.clone(), authenticator.clone(), roles.clone());
        route = route.route_layer(axum::middleware::from_fn_with_state(
            guard,
            auth_middleware::<D>,
        ));
    }

    Ok(pipeline.apply(route))
}

/// The path with capture names erased.
///
/// Two paths that differ only in what they call a capture (`/items/:id` and
/// `/items/:name`) match the same requests, and the router refuses the second.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.chars().next() {
            Some(':') => ":",
            Some('*') => "*",
            _ => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Declared methods plus OPTIONS, so preflights reach the CORS gate.
fn method_filter(path: &str, methods: &[Method]) -> Result<MethodFilter, StartupError> {
    methods.iter().try_fold(MethodFilter::OPTIONS, |filter, method| {
        MethodFilter::try_from(method.clone())
            .map(|m| filter.or(m))
            .map_err(|_| StartupError::UnsupportedMethod {
                path: path.to_string(),
                method: method.clone(),
            })
    })
}

/// Build the router served by the `grails-api` binary.
pub async fn build_app(config: &AppConfig, pool: PgPool) -> Result<Router, StartupError> {
    let authenticator = Arc::new(Authenticator::new(
        TokenCodec::new(&config.signing_key),
        Arc::new(services::PgUserResolver),
    ));
    let pipeline = Pipeline::new().cors(config.cors_origins.clone());

    create_router(pool, authenticator, vec![routes::system::service()], &pipeline).await
}
