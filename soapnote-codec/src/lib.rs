//! Flat marker-delimited visit note <-> `ClinicalDocument` codec.
//!
//! Parsing never fails on content: missing sections and undecodable embedded
//! data resolve to defaults, optionally reported as [`FieldDiagnostic`]s.

pub mod clipboard;
pub mod diagnostics;
pub mod orders;
pub mod procedure;
pub mod sanitize;
pub mod segment;
pub mod serialize;
pub mod session;
pub mod soap;
pub mod store;

use serde::Serialize;
use soapnote_core::{ClinicalDocument, CodecConfig, CodecError};
use tracing::debug;

pub use clipboard::format_for_clipboard;
pub use diagnostics::{Decoded, FieldDiagnostic};
pub use segment::{segment_document, Segments};
pub use serialize::{serialize_document, serialize_with_config};
pub use session::EditSession;
pub use store::{DirectoryStore, DocumentStore, MemoryStore};

/// Parsed note plus the fields that had to be defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    pub document: ClinicalDocument,
    pub diagnostics: Vec<FieldDiagnostic>,
    /// The note had no `$soap_notes -` marker.
    pub legacy_layout: bool,
}

/// Parse a stored note into its structured form.
pub fn parse_document(raw: &str) -> ClinicalDocument {
    parse_document_with_report(raw).document
}

pub fn parse_document_with_report(raw: &str) -> ParseReport {
    let segments = segment_document(raw);
    let mut diagnostics = Vec::new();

    let soap = soap::parse_soap_reporting(segments.soap, &mut diagnostics);
    let procedure = procedure::sectionize(segments.procedure);
    let orders = orders::parse_orders_reporting(segments.orders, &mut diagnostics);

    debug!(
        defaulted = diagnostics.len(),
        orders = orders.orders.len(),
        "parsed note"
    );

    ParseReport {
        document: ClinicalDocument {
            soap,
            procedure_text: segments.procedure.to_string(),
            procedure,
            orders,
        },
        diagnostics,
        legacy_layout: segments.legacy,
    }
}

/// Parse then re-serialize in canonical form.
pub fn roundtrip(raw: &str, config: &CodecConfig) -> Result<String, CodecError> {
    serialize_with_config(&parse_document(raw), config)
}
