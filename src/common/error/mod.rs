//! Unified error types for the rtfcraft library.
//!
//! Codec-level failures are reported as [`crate::rtf::RtfError`]; this module
//! wraps them together with I/O failures for the operations that touch a sink.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
