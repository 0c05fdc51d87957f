//! `grails-core`: transport-agnostic building blocks shared by the other crates.
//!
//! This crate has no HTTP or storage concerns.

pub mod error;

pub use error::{Augmented, BoxError, augment};
