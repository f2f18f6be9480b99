//! Workbook container detection.
//!
//! A Tableau workbook comes either as a bare XML document (`.twb`) or as a
//! packaged ZIP archive (`.twbx`). The container is chosen from the file name.

// Submodule declarations
pub mod functions;
pub mod types;

// Re-exports
pub use functions::{detect_container_format, is_supported_workbook};
pub use types::ContainerFormat;
