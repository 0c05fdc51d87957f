//! HTTP API scaffolding: middleware pipeline, handler adapter, and service
//! registration on top of Axum.

pub mod app;
pub mod config;
pub mod context;
pub mod cors;
pub mod errors;
pub mod handler;
pub mod json;
pub mod middleware;
pub mod pipeline;
pub mod service;

pub use app::{StartupError, create_router};
pub use config::{AppConfig, ConfigError};
pub use context::AuthContext;
pub use cors::AllowedOrigins;
pub use errors::{ResponseError, augment_with_status};
pub use handler::{BoxHandler, HandlerDescriptor};
pub use json::{Reply, handle_with_error};
pub use middleware::{AuthError, Authenticator, RouteGuard};
pub use pipeline::Pipeline;
pub use service::Service;
