use axum::extract::Request;
use serde_json::{Value, json};

use crate::context::AuthContext;
use crate::errors::ResponseError;
use crate::handler::HandlerDescriptor;
use crate::json::{Reply, handle_with_error};
use crate::service::Service;

pub const PREFIX: &str = "api";

/// Roles allowed to call `/api/me`.
pub const ME_ROLES: [&str; 2] = ["admin", "user"];

/// `GET /api/ping` (public) and `GET /api/me` (authenticated).
pub fn service<D>() -> Service<D> {
    Service::new(PREFIX)
        .handler("ping", HandlerDescriptor::get(handle_with_error(ping)))
        .handler(
            "me",
            HandlerDescriptor::get(handle_with_error(me)).protected(ME_ROLES),
        )
}

pub async fn ping(_req: Request) -> Result<Reply<Value>, ResponseError> {
    Ok(Reply::Json(json!({ "ok": true })))
}

pub async fn me(req: Request) -> Result<Reply<AuthContext>, ResponseError> {
    Ok(Reply::Json(AuthContext::of(&req)?.clone()))
}
