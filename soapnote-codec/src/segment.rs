//! Top-level split of a raw note into SOAP, procedure and orders text.

use tracing::debug;

pub const SOAP_MARKER: &str = "$soap_notes -";
pub const PROCEDURE_MARKER: &str = "$procedure_notes -";
pub const ORDERS_MARKER: &str = "$orders -";

/// The three raw sub-strings of a stored note. Any of them may be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segments<'a> {
    pub soap: &'a str,
    pub procedure: &'a str,
    pub orders: &'a str,
    /// The note predates the `$soap_notes -` marker.
    pub legacy: bool,
}

/// Text following the first `marker`, up to the earliest of `next_markers`.
///
/// Returns an empty string when `marker` does not occur. The block is trimmed.
pub fn extract_block<'a>(raw: &'a str, marker: &str, next_markers: &[&str]) -> &'a str {
    let Some(position) = raw.find(marker) else {
        return "";
    };
    let rest = &raw[position + marker.len()..];
    let end = earliest(rest, next_markers).unwrap_or(rest.len());
    rest[..end].trim()
}

pub fn segment_document(raw: &str) -> Segments<'_> {
    let legacy = !raw.contains(SOAP_MARKER) && !raw.trim().is_empty();

    let soap = if legacy {
        let end = earliest(raw, &[PROCEDURE_MARKER, ORDERS_MARKER]).unwrap_or(raw.len());
        raw[..end].trim()
    } else {
        extract_block(raw, SOAP_MARKER, &[PROCEDURE_MARKER, ORDERS_MARKER])
    };

    let segments = Segments {
        soap,
        procedure: extract_block(raw, PROCEDURE_MARKER, &[ORDERS_MARKER]),
        orders: extract_block(raw, ORDERS_MARKER, &[]),
        legacy,
    };

    debug!(
        legacy,
        soap_len = segments.soap.len(),
        procedure_len = segments.procedure.len(),
        orders_len = segments.orders.len(),
        "segmented note"
    );

    segments
}

/// Byte offset of the earliest occurrence of any needle.
pub(crate) fn earliest(text: &str, needles: &[&str]) -> Option<usize> {
    needles.iter().filter_map(|needle| text.find(needle)).min()
}
