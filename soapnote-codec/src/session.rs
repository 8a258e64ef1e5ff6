//! A single editing session: load, edit in memory, commit.

use soapnote_core::{ClinicalDocument, CodecConfig, CodecError, EncounterMeta, RenderedSection};
use tracing::{debug, info};

use crate::procedure::{render_sections, sectionize};
use crate::serialize::serialize_with_config;
use crate::store::DocumentStore;
use crate::{parse_document_with_report, FieldDiagnostic};

/// Owns the structured note for one document id. Nothing is shared between sessions.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: String,
    document: ClinicalDocument,
    diagnostics: Vec<FieldDiagnostic>,
    meta: Option<EncounterMeta>,
}

impl EditSession {
    /// Load and parse. If the load fails no session is created.
    pub fn open<S>(store: &S, id: &str, meta: Option<EncounterMeta>) -> Result<Self, CodecError>
    where
        S: DocumentStore + ?Sized,
    {
        let raw = store.load(id)?;
        let report = parse_document_with_report(&raw);
        debug!(
            id,
            defaulted = report.diagnostics.len(),
            legacy = report.legacy_layout,
            "opened note"
        );

        Ok(Self {
            id: id.to_string(),
            document: report.document,
            diagnostics: report.diagnostics,
            meta,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &ClinicalDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ClinicalDocument {
        &mut self.document
    }

    /// Fields that were present in the stored note but could not be decoded.
    pub fn diagnostics(&self) -> &[FieldDiagnostic] {
        &self.diagnostics
    }

    /// Replace the procedure text and rebuild its sectioned view.
    pub fn set_procedure_text(&mut self, text: impl Into<String>) {
        self.document.procedure_text = text.into();
        self.document.procedure = sectionize(&self.document.procedure_text);
    }

    pub fn render_procedure(&self) -> Vec<RenderedSection> {
        render_sections(&self.document.procedure, self.meta.as_ref())
    }

    /// Serialize the whole note and hand it to the store. Returns the saved text.
    pub fn commit<S>(&self, store: &mut S, config: &CodecConfig) -> Result<String, CodecError>
    where
        S: DocumentStore + ?Sized,
    {
        let raw = serialize_with_config(&self.document, config)?;
        store.save(&self.id, &raw)?;
        info!(id = %self.id, bytes = raw.len(), "saved note");
        Ok(raw)
    }
}
