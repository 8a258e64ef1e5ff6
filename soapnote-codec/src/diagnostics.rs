//! Per-field decode outcomes, collapsed to plain defaults at the struct boundary.

use serde::Serialize;
use tracing::{debug, warn};

/// Result of decoding one embedded block.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Parsed(T),
    /// The segment or label was not present at all.
    Absent,
    /// Content was present but could not be decoded.
    Defaulted(String),
}

impl<T: Default> Decoded<T> {
    pub fn into_value(self) -> T {
        match self {
            Decoded::Parsed(value) => value,
            Decoded::Absent | Decoded::Defaulted(_) => T::default(),
        }
    }

    /// Collapse to a value, recording a diagnostic when content was defaulted.
    pub fn collapse(self, field: &str, diagnostics: &mut Vec<FieldDiagnostic>) -> T {
        match &self {
            Decoded::Parsed(_) => {}
            Decoded::Absent => debug!(field, "segment absent, using default"),
            Decoded::Defaulted(reason) => {
                warn!(field, reason = %reason, "embedded data defaulted");
                diagnostics.push(FieldDiagnostic {
                    field: field.to_string(),
                    reason: reason.clone(),
                });
            }
        }
        self.into_value()
    }
}

/// A field whose content was present but replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    pub field: String,
    pub reason: String,
}
