//! Compact signed tokens (HS256 JWT).
//!
//! Tokens carry [`Claims`] only. The codec checks form and signature; expiry is
//! left to the authorization layer so it can be ordered after the role check.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{Claims, SigningKey, UserId};

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Issues and parses tokens with a single signing key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
}

impl TokenCodec {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Signature only: registered claims (exp, nbf, aud, ...) are not checked here.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            lifetime: TimeDelta::minutes(TOKEN_LIFETIME_MINUTES),
        }
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Issue a token for `user_id` expiring one lifetime from now.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were `issued_at`.
    pub fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, issued_at + self.lifetime);
        // `Header::new` sets `typ: "JWT"`.
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify `token` and return its signed claims.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::InvalidSignature) {
                    TokenError::InvalidSignature
                } else {
                    TokenError::Malformed(e)
                }
            })
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SigningKey::new("test-secret"))
    }

    fn segment_json(token: &str, index: usize) -> serde_json::Value {
        let segment = token.split('.').nth(index).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn round_trip_preserves_user_and_expiry() {
        let codec = codec();
        let issued_at = Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap();

        for id in [0, 7, 42, u64::from(u32::MAX), u64::MAX] {
            let token = codec.issue_at(UserId::new(id), issued_at).unwrap();
            let claims = codec.parse(&token).unwrap();
            assert_eq!(claims.user_id, UserId::new(id));
            assert_eq!(claims.expiry, issued_at + TimeDelta::minutes(5));
        }
    }

    #[test]
    fn issue_uses_current_time() {
        let codec = codec();
        let before = Utc::now();
        let claims = codec.parse(&codec.issue(UserId::new(3)).unwrap()).unwrap();
        let after = Utc::now();

        // Signed expiry has second resolution.
        assert!(claims.expiry.timestamp() >= (before + codec.lifetime()).timestamp());
        assert!(claims.expiry.timestamp() <= (after + codec.lifetime()).timestamp());
    }

    #[test]
    fn compact_form_has_jwt_header_and_expected_payload() {
        let issued_at = Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap();
        let token = codec().issue_at(UserId::new(9), issued_at).unwrap();

        assert_eq!(token.split('.').count(), 3);

        let header = segment_json(&token, 0);
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let payload = segment_json(&token, 1);
        assert_eq!(payload["user_id"], 9);
        assert_eq!(payload["exp"], (issued_at + TimeDelta::minutes(5)).timestamp());
    }

    #[test]
    fn parse_ignores_expiry() {
        let long_ago = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let codec = codec();
        let claims = codec.parse(&codec.issue_at(UserId::new(1), long_ago).unwrap()).unwrap();
        assert!(claims.is_expired(Utc::now()));
    }

    #[test]
    fn foreign_key_fails_with_signature_error() {
        let token = TokenCodec::new(&SigningKey::new("other-secret"))
            .issue(UserId::new(7))
            .unwrap();
        assert!(matches!(codec().parse(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "not-a-token", "a.b", "a.b.c"] {
            assert!(
                matches!(codec().parse(token), Err(TokenError::Malformed(_))),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.issue(UserId::new(7)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"user_id":1,"exp":4102444800}"#);
        parts[1] = &forged;

        assert!(matches!(
            codec.parse(&parts.join(".")),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn unsigned_tokens_are_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_id":1,"exp":4102444800}"#);
        let token = format!("{header}.{payload}.");

        assert!(codec().parse(&token).is_err());
    }
}
