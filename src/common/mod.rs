//! Common types and utilities shared by the writer and the stripper.

// Submodule declarations
pub mod error;
pub mod unit;

// Re-exports for convenience
pub use error::{Error, Result};
