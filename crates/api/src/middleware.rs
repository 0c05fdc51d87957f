//! Token authentication and role authorization.
//!
//! For a protected route, each request goes through, in order:
//!
//! 1. token parse + signature check (`400` on failure, including no header)
//! 2. user lookup via the resolver (`500` on failure)
//! 3. role membership (`401` on miss)
//! 4. expiry (`401` once expired)
//!
//! and only then reaches the handler, with an [`AuthContext`] attached.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use thiserror::Error;

use grails_auth::{AuthUser, Claims, Role, TokenCodec, TokenError, UserResolver};
use grails_core::{Augmented, augment};

use crate::context::AuthContext;

pub const USER_LOOKUP_FAILED: &str = "error getting user by id";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("Authorization header is not valid text")]
    InvalidHeader,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    UserLookup(Augmented),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidHeader | AuthError::Token(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::UserLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns request credentials into users: token codec plus user resolver.
pub struct Authenticator<D> {
    codec: TokenCodec,
    resolver: Arc<dyn UserResolver<D>>,
}

impl<D> Authenticator<D>
where
    D: Send + Sync,
{
    pub fn new(codec: TokenCodec, resolver: Arc<dyn UserResolver<D>>) -> Self {
        Self { codec, resolver }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Parse and verify the token carried by `headers`.
    ///
    /// The raw header value is the token; a leading `Bearer ` is tolerated.
    pub fn claims_from_headers(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let raw = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidHeader)?;
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw);

        Ok(self.codec.parse(token)?)
    }

    pub async fn resolve(&self, store: &D, claims: &Claims) -> Result<Box<dyn AuthUser>, AuthError> {
        self.resolver
            .resolve(store, claims.user_id)
            .await
            .map_err(|e| AuthError::UserLookup(augment(USER_LOOKUP_FAILED, e)))
    }

    /// Resolve the bearer of a request, without any role or expiry check.
    pub async fn user_from_headers(
        &self,
        store: &D,
        headers: &HeaderMap,
    ) -> Result<Box<dyn AuthUser>, AuthError> {
        let claims = self.claims_from_headers(headers)?;
        self.resolve(store, &claims).await
    }
}

impl<D> core::fmt::Debug for Authenticator<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Middleware state for one protected route.
pub struct RouteGuard<D> {
    store: D,
    authenticator: Arc<Authenticator<D>>,
    allowed_roles: Arc<HashSet<Role>>,
}

impl<D> RouteGuard<D> {
    pub fn new(store: D, authenticator: Arc<Authenticator<D>>, allowed_roles: HashSet<Role>) -> Self {
        Self {
            store,
            authenticator,
            allowed_roles: Arc::new(allowed_roles),
        }
    }

    pub fn allows(&self, role: &str) -> bool {
        self.allowed_roles.contains(role)
    }
}

impl<D: Clone> Clone for RouteGuard<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            allowed_roles: self.allowed_roles.clone(),
        }
    }
}

pub async fn auth_middleware<D>(
    State(guard): State<RouteGuard<D>>,
    mut req: Request,
    next: Next,
) -> Response
where
    D: Clone + Send + Sync + 'static,
{
    let claims = match guard.authenticator.claims_from_headers(req.headers()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting request without a usable token");
            return e.status().into_response();
        }
    };

    let user = match guard.authenticator.resolve(&guard.store, &claims).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(user_id = %claims.user_id, error = %e, "user lookup failed");
            return (e.status(), e.to_string()).into_response();
        }
    };

    let role = user.role();
    if !guard.allows(role) {
        tracing::debug!(user_id = %claims.user_id, role, "role not allowed on route");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if claims.is_expired(Utc::now()) {
        tracing::debug!(user_id = %claims.user_id, expiry = %claims.expiry, "token expired");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    req.extensions_mut()
        .insert(AuthContext::new(claims.user_id, Role::from(role.to_string())));

    next.run(req).await
}
