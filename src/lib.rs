//! workbook-metrics - structural and complexity metrics for Tableau workbooks
//!
//! A Tableau workbook is an XML document (`.twb`), optionally packaged in a
//! ZIP archive together with extracts and images (`.twbx`). This library
//! reads either container and reports a fixed set of metrics describing how
//! large and how complex the workbook is.
//!
//! # Features
//!
//! - **Archive loading**: bare `.twb` files and packaged `.twbx` archives
//! - **XML tree**: a small, immutable element tree with descendant queries
//! - **Metrics**: dashboards, views, data sources, custom SQL, formula length,
//!   field count and quick filter count
//! - **Thresholds**: YAML-configured limits checked against the metrics
//! - **Batch processing**: many workbooks in parallel, one failure per file
//!
//! # Example
//!
//! ```no_run
//! use workbook_metrics::policy::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = workbook_metrics::workbook_metrics("Superstore.twbx")?;
//! println!("{} dashboards, {} views", record.dashboards, record.views);
//!
//! let config = Config::from_path("config.yml")?;
//! for violation in config.performance_thresholds.check(&record) {
//!     println!("rejected: {}", violation);
//! }
//! # Ok(())
//! # }
//! ```

/// Error types and container detection shared by every stage
pub mod common;

/// Loading the workbook XML out of `.twb` and `.twbx` files
pub mod archive;

/// Parsed workbook document and its element tree
pub mod document;

/// Metric extraction
pub mod metrics;

/// Threshold configuration
pub mod policy;

/// Pipeline composition and parallel processing
pub mod batch;

// Re-export commonly used types for convenience
pub use batch::{
    FileMetrics, collect_workbook_paths, metrics_from_bytes, workbook_metrics,
    workbook_metrics_many,
};
pub use common::{ContainerFormat, Error, Result};
pub use document::WorkbookDocument;
pub use metrics::{MetricsRecord, extract};
