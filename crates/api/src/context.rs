use axum::extract::Request;
use serde::Serialize;

use grails_auth::{Role, UserId};

use crate::errors::ResponseError;

/// The authenticated caller of a protected route.
///
/// Inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    user_id: UserId,
    role: Role,
}

impl AuthContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Read the context of a request that went through the auth middleware.
    pub fn of(req: &Request) -> Result<&Self, ResponseError> {
        req.extensions()
            .get::<Self>()
            .ok_or_else(|| ResponseError::internal("route is not protected"))
    }
}

/// Fetch the store handle attached to every mounted route.
pub fn store<D>(req: &Request) -> Result<D, ResponseError>
where
    D: Clone + Send + Sync + 'static,
{
    req.extensions()
        .get::<D>()
        .cloned()
        .ok_or_else(|| ResponseError::internal("store handle is not available"))
}
