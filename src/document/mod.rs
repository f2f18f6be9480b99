//! Workbook document model.
//!
//! A [`WorkbookDocument`] is the parsed form of the `.twb` XML: a tree of
//! [`Element`]s rooted at `<workbook>`. It is immutable once built and is
//! discarded after the metrics have been extracted.
//!
//! # Example
//!
//! ```rust,no_run
//! use workbook_metrics::WorkbookDocument;
//!
//! let doc = WorkbookDocument::open("Superstore.twbx")?;
//! for datasource in doc.top_level_datasources() {
//!     println!("{:?}", datasource.attribute("caption"));
//! }
//! println!("{:?}", doc.metrics());
//! # Ok::<(), workbook_metrics::Error>(())
//! ```

pub mod element;
pub mod parser;

pub use element::{Descendants, Element, Node};
pub use parser::parse;

use std::path::Path;

use crate::common::Result;
use crate::metrics::{self, MetricsRecord};

/// Tag name of the document root.
pub const WORKBOOK_TAG: &str = "workbook";

/// A parsed workbook document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookDocument {
    root: Element,
}

impl WorkbookDocument {
    pub(crate) fn new(root: Element) -> Self {
        Self { root }
    }

    /// Load and parse a `.twb` or `.twbx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = crate::archive::load(path)?;
        parse(&bytes)
    }

    /// Parse workbook XML bytes
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        parse(bytes)
    }

    /// The root element
    #[inline]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Data sources declared directly under `/workbook/datasources`.
    ///
    /// Data sources nested elsewhere (for example the copies embedded in
    /// worksheet dependencies) are not included. Yields nothing when the
    /// root is not `<workbook>`.
    pub fn top_level_datasources(&self) -> impl Iterator<Item = &Element> {
        let containers = if self.root.name() == WORKBOOK_TAG {
            Some(self.root.children_named("datasources"))
        } else {
            None
        };

        containers
            .into_iter()
            .flatten()
            .flat_map(|container| container.children_named("datasource"))
    }

    /// Compute the metrics record for this document
    #[inline]
    pub fn metrics(&self) -> MetricsRecord {
        metrics::extract(self)
    }
}
