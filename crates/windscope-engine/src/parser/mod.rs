//! XML payload parsers
//!
//! Both archive families carry small XML documents produced by the turbine
//! controllers. Parsing is tolerant: a payload that is not XML is dropped as
//! a whole, while a bad field drops only itself.

mod readings;
mod statistics;

pub use readings::{is_implausible, parse_readings, ReadingFilter, READING_TIMESTAMP_FORMAT};
pub use statistics::{parse_duration, parse_statistics, FAULT_MODES};

use std::borrow::Cow;

use roxmltree::{Document, ParsingOptions};
use windscope_core::Skip;

/// Decode payload bytes to text
///
/// Controllers write either UTF-8 or Latin-1; a leading byte order mark is
/// dropped.
pub fn decode_payload(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Parse a payload into a document
pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, Skip> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|e| {
        tracing::debug!(error = %e, "Payload is not well-formed XML");
        Skip::PayloadMalformed
    })
}

/// Parse a numeric field the way the controllers write them
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Direct children of `node` with the given tag name
pub(crate) fn children_named<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}
