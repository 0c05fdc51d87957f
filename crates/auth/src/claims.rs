use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Signed token payload.
///
/// On the wire this is `{"user_id": <uint>, "exp": <unix-seconds>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,

    /// Absolute expiry instant (second resolution once signed).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expiry: DateTime<Utc>,
}

impl Claims {
    pub fn new(user_id: UserId, expiry: DateTime<Utc>) -> Self {
        Self { user_id, expiry }
    }

    /// A token is expired once `now` has reached its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}
