//! Structured JSON logs for the `grails-api` binary.
//!
//! Output goes to stdout, one JSON object per event, filtered by `RUST_LOG`
//! (default [`tracing::DEFAULT_FILTER`]). Nothing here logs on its own; the
//! api crate emits events through the `tracing` macros.

pub mod tracing;

/// Install the JSON subscriber. Later calls leave the first one in place.
pub fn init() {
    tracing::init();
}
