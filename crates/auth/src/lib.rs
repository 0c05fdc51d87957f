//! `grails-auth`: token issuance/validation and the user capability seam.
//!
//! This crate is intentionally decoupled from HTTP and storage: stores are
//! opaque type parameters and user lookup is delegated to a [`UserResolver`].

pub mod claims;
pub mod key;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::Claims;
pub use key::{DEV_SIGNING_KEY, KeyError, SigningKey};
pub use roles::Role;
pub use token::{TOKEN_LIFETIME_MINUTES, TokenCodec, TokenError};
pub use user::{AuthUser, UserId, UserRecord, UserResolver};
