//! User identity and the lookup seam used by the authentication middleware.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Numeric identifier of a user, as carried in token claims.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// The only capability the pipeline needs from a user: its role.
pub trait AuthUser: Send + Sync {
    fn role(&self) -> &str;
}

/// Plain user record for resolvers that only load what authorization needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub role: Role,
}

impl AuthUser for UserRecord {
    fn role(&self) -> &str {
        self.role.as_str()
    }
}

/// Resolves a token bearer to a user through an opaque store handle `D`.
///
/// Failures are backend trouble (store unreachable, row missing, ...), not
/// credential problems; the middleware reports them as `500`.
#[async_trait]
pub trait UserResolver<D>: Send + Sync {
    async fn resolve(&self, store: &D, user_id: UserId) -> anyhow::Result<Box<dyn AuthUser>>;
}
