//! Process-wide HMAC signing key.
//!
//! The key is established once at startup and threaded explicitly to whoever
//! issues or verifies tokens. It is never logged: `Debug` is redacted.

use std::sync::Arc;

use thiserror::Error;

/// Key used when no deployment environment is configured (local development).
pub const DEV_SIGNING_KEY: &[u8] = b"LOCAL_MOCK_JWT_SIGNING_KEY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("JWT_SIGNING_KEY is required when ENVIRONMENT is set (environment: {environment})")]
    Missing { environment: String },

    #[error("JWT_SIGNING_KEY is not valid unicode")]
    NotUnicode,
}

/// Immutable HMAC key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(bytes.as_ref()))
    }

    /// The fixed development key.
    pub fn development() -> Self {
        Self::new(DEV_SIGNING_KEY)
    }

    /// Pick the key for the given deployment environment.
    ///
    /// An empty (or absent) environment always yields the development key,
    /// whatever `key` says. Otherwise `key` must be present and non-empty.
    pub fn select(environment: Option<&str>, key: Option<&str>) -> Result<Self, KeyError> {
        let environment = environment.unwrap_or_default();
        if environment.is_empty() {
            return Ok(Self::development());
        }

        match key {
            Some(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(KeyError::Missing {
                environment: environment.to_string(),
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}
