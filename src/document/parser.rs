//! Workbook XML parser.
//!
//! Builds an [`Element`] tree from the raw document bytes using quick-xml's
//! event reader. Comments, processing instructions and whitespace-only text
//! are dropped. Any well-formedness violation is reported as
//! [`Error::MalformedDocument`].

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::WorkbookDocument;
use super::element::Element;
use crate::common::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Deepest element nesting accepted, the same limit libxml2 applies by default.
///
/// The tree is dropped and cloned recursively, so the limit also bounds stack use.
pub const MAX_DEPTH: usize = 256;

/// Parse workbook XML bytes into a [`WorkbookDocument`].
///
/// The document must be UTF-8 and nest no deeper than [`MAX_DEPTH`] elements.
///
/// # Example
///
/// ```
/// use workbook_metrics::document::parse;
///
/// let doc = parse(br#"<workbook><worksheets><worksheet name="S"/></worksheets></workbook>"#)?;
/// assert_eq!(doc.root().name(), "workbook");
/// assert_eq!(doc.root().descendants_named("worksheet").count(), 1);
/// # Ok::<(), workbook_metrics::Error>(())
/// ```
pub fn parse(bytes: &[u8]) -> Result<WorkbookDocument> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    // Comments, declarations and processing instructions are skipped below,
    // so their encoding is checked here together with everything else
    std::str::from_utf8(bytes)?;

    let mut reader = Reader::from_reader(bytes);
    let config = reader.config_mut();
    config.expand_empty_elements = true;
    config.check_end_names = true;

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(malformed(&reader, "more than one root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed(&reader, "excessive nesting depth"));
                }
                if let Some(parent) = stack.last_mut() {
                    parent.discard_trailing_whitespace();
                }
                stack.push(element_from_start(e)?);
            },
            Ok(Event::End(_)) => {
                let Some(mut element) = stack.pop() else {
                    return Err(malformed(&reader, "unexpected closing tag"));
                };
                element.discard_trailing_whitespace();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None => root = Some(element),
                }
            },
            Ok(Event::Text(e)) => {
                let raw = e.into_inner();
                let text = std::str::from_utf8(&raw)?;
                push_text(&mut stack, &reader, &normalize_line_endings(text))?;
            },
            Ok(Event::GeneralRef(e)) => {
                let name = std::str::from_utf8(&e)?;
                let reference = format!("&{};", name);
                let resolved = unescape(&reference)?;
                push_text(&mut stack, &reader, &resolved)?;
            },
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                let text = std::str::from_utf8(&raw)?;
                match stack.last_mut() {
                    Some(current) => current.push_text(text),
                    None => {
                        return Err(malformed(&reader, "character data outside the root element"));
                    },
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&reader, &e.to_string())),
            // Comments, declarations, processing instructions and doctypes carry no structure
            _ => {},
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        let message = format!("unexpected end of document, <{}> is not closed", open.name());
        return Err(malformed(&reader, &message));
    }

    root.map(WorkbookDocument::new)
        .ok_or_else(|| Error::MalformedDocument("no root element found".to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;

        // Namespace declarations are not attributes of the element
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }

        if memchr::memchr(b'<', &attr.value).is_some() {
            return Err(Error::MalformedDocument(format!(
                "unescaped '<' in value of attribute {} on <{}>",
                key, name
            )));
        }

        let raw = std::str::from_utf8(&attr.value)?;
        let value = unescape(&normalize_attribute_value(raw))?.into_owned();
        element.push_attribute(key.to_string(), value);
    }

    Ok(element)
}

/// Text is only allowed outside the root element when it is whitespace.
fn push_text(stack: &mut [Element], reader: &Reader<&[u8]>, text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            current.push_text(text);
            Ok(())
        },
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed(reader, "text outside the root element")),
    }
}

/// Attribute-value normalisation: a literal tab, line feed or carriage
/// return becomes a single space. Character references such as `&#10;`
/// are resolved afterwards and therefore keep their newline.
fn normalize_attribute_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace("\r\n", " ")
            .replace(['\t', '\n', '\r'], " "),
    )
}

fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn malformed(reader: &Reader<&[u8]>, message: &str) -> Error {
    Error::MalformedDocument(format!("{} (at byte {})", message, reader.buffer_position()))
}
