//! Common types shared across the pipeline stages.

// Submodule declarations
pub mod detection;
pub mod error;

// Re-exports for convenience
pub use detection::{ContainerFormat, detect_container_format};
pub use error::{Error, Result};
