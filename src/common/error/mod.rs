//! Unified error types for workbook metric extraction.
//!
//! Every stage of the pipeline (loading, parsing, configuration) reports
//! failures through the single [`Error`] type defined here.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
