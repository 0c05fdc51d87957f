//! Error shaping.
//!
//! Errors crossing a boundary get a short contextual message in front of them.
//! The wire form is always `"<message>: <cause>"`, but the cause stays attached
//! so callers can still inspect it.

use thiserror::Error;

/// Boxed, thread-safe error used where the concrete cause type is not known.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error with a contextual message prepended to its cause.
#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct Augmented {
    message: String,
    #[source]
    source: BoxError,
}

impl Augmented {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Recover the cause, e.g. to downcast it.
    pub fn into_cause(self) -> BoxError {
        self.source
    }
}

/// Wrap `cause` with `message`.
///
/// ```
/// let err = grails_core::augment("error getting user by id", "no rows");
/// assert_eq!(err.to_string(), "error getting user by id: no rows");
/// ```
pub fn augment(message: impl Into<String>, cause: impl Into<BoxError>) -> Augmented {
    Augmented {
        message: message.into(),
        source: cause.into(),
    }
}
