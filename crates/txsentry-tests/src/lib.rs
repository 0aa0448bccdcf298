//! End-to-end and adversarial test suite for txsentry.
//!
//! Tests in this crate load real artifact files from disk and drive the
//! inference service the same way the server and CLI do.

pub mod helpers;
