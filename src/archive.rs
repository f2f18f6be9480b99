//! Workbook loading from bare (.twb) and packaged (.twbx) containers.
//!
//! A packaged workbook is a ZIP archive holding the workbook XML together
//! with extracts and images. The XML member may be named differently from
//! the archive itself, so the member list is scanned for the first `.twb`
//! entry in central-directory order.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::debug;
use zip::ZipArchive;

use crate::common::detection::{ContainerFormat, detect_container_format};
use crate::common::{Error, Result};

/// Suffix identifying the workbook document inside a packaged workbook.
const DOCUMENT_SUFFIX: &str = ".twb";

/// Load the raw workbook XML bytes from a `.twb` or `.twbx` file.
///
/// The input file is only read, never modified.
///
/// # Errors
///
/// * [`Error::UnsupportedFormat`] if the extension is neither `.twb` nor `.twbx`
/// * [`Error::Io`] if the file cannot be read
/// * [`Error::ArchiveCorrupt`] if a `.twbx` is not a valid ZIP archive
/// * [`Error::DocumentNotFound`] if a `.twbx` contains no `.twb` member
///
/// # Examples
///
/// ```no_run
/// let xml = workbook_metrics::archive::load("Superstore.twbx")?;
/// println!("workbook document is {} bytes", xml.len());
/// # Ok::<(), workbook_metrics::Error>(())
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let format = detect_container_format(path)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

    debug!("loading {} as {}", path.display(), format);

    if format.is_packaged() {
        let file = File::open(path)?;
        read_document_from_archive(BufReader::new(file))
    } else {
        Ok(std::fs::read(path)?)
    }
}

/// Load the raw workbook XML bytes from a reader whose container format is
/// already known.
pub fn load_from_reader<R: Read + Seek>(
    format: ContainerFormat,
    mut reader: R,
) -> Result<Vec<u8>> {
    if format.is_packaged() {
        return read_document_from_archive(reader);
    }
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// Read the first `.twb` member of a packaged workbook.
///
/// Members are visited in listing order; later `.twb` members are ignored.
pub fn read_document_from_archive<R: Read + Seek>(reader: R) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| Error::ArchiveCorrupt(format!("Invalid ZIP archive: {}", e)))?;

    let (index, name) = document_member(&archive).ok_or_else(|| {
        Error::DocumentNotFound(format!(
            "no {} member among {} entries",
            DOCUMENT_SUFFIX,
            archive.len()
        ))
    })?;

    debug!("selected archive member {} (entry {})", name, index);

    let mut member = archive
        .by_index(index)
        .map_err(|e| Error::ArchiveCorrupt(format!("Failed to open member {}: {}", name, e)))?;

    let mut content = Vec::new();
    member
        .read_to_end(&mut content)
        .map_err(|e| {
            Error::ArchiveCorrupt(format!("Failed to decompress member {}: {}", name, e))
        })?;
    Ok(content)
}

/// Locate the first member whose name ends with `.twb`, in any ASCII case.
fn document_member<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<(usize, String)> {
    (0..archive.len()).find_map(|i| {
        let name = archive.name_for_index(i)?;
        is_document_member(name).then(|| (i, name.to_string()))
    })
}

#[inline]
fn is_document_member(name: &str) -> bool {
    let Some(start) = name.len().checked_sub(DOCUMENT_SUFFIX.len()) else {
        return false;
    };
    name.as_bytes()[start..].eq_ignore_ascii_case(DOCUMENT_SUFFIX.as_bytes())
}
