//! The `utils` module collects shared definitions used across `wsrelay`:
//! the crate error type and the tracing setup.

pub mod error;
pub mod logging;

pub use error::RelayError;
