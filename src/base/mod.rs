//! Base types and error handling.
//!
//! Provides the foundational error type:
//! - [`JarError`](jarerror::JarError): caller errors at the jar's API
//!   boundary, kept distinct from protocol-level parsing tolerance.

pub mod jarerror;
