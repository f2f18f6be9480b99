//! Container format detection functions.
//!
//! Workbooks are identified by their file name alone. The bytes are never
//! sniffed: a `.twbx` that is not a ZIP archive is reported as corrupt by
//! the loader rather than silently treated as a bare document.

use std::path::Path;

use super::types::ContainerFormat;

/// Detect the container format from a file path's extension.
///
/// The comparison ignores ASCII case, so `Sales.TWBX` is recognised as a
/// packaged workbook.
///
/// # Returns
///
/// * `Some(ContainerFormat)` for `.twb` and `.twbx`
/// * `None` for any other extension, or no extension at all
///
/// # Examples
///
/// ```
/// use workbook_metrics::common::detection::{ContainerFormat, detect_container_format};
///
/// assert_eq!(detect_container_format("sales.twbx"), Some(ContainerFormat::Twbx));
/// assert_eq!(detect_container_format("sales.xlsx"), None);
/// ```
pub fn detect_container_format<P: AsRef<Path>>(path: P) -> Option<ContainerFormat> {
    let extension = path.as_ref().extension()?.to_str()?;

    [ContainerFormat::Twb, ContainerFormat::Twbx]
        .into_iter()
        .find(|format| extension.eq_ignore_ascii_case(format.extension()))
}

/// Whether a path names a workbook this crate can read.
#[inline]
pub fn is_supported_workbook<P: AsRef<Path>>(path: P) -> bool {
    detect_container_format(path).is_some()
}
