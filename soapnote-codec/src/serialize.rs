//! Canonical flat-text rendering of a structured note.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use soapnote_core::{ClinicalDocument, CodecConfig, CodecError};

use crate::segment::{ORDERS_MARKER, PROCEDURE_MARKER, SOAP_MARKER};
use crate::soap::{
    ASSESSMENT_PLAN_LABEL, FAMILY_HISTORY_LABEL, OBJECTIVE_LABEL, PATIENT_LABEL, REASON_LABEL,
    ROS_LABEL, SOCIAL_HISTORY_LABEL, SUBJECTIVE_LABEL, SURGICAL_HISTORY_LABEL,
};

pub fn serialize_document(document: &ClinicalDocument) -> Result<String, CodecError> {
    serialize_with_config(document, &CodecConfig::default())
}

/// Rebuild the stored text. The procedure text is written back unchanged.
pub fn serialize_with_config(
    document: &ClinicalDocument,
    config: &CodecConfig,
) -> Result<String, CodecError> {
    let soap = &document.soap;
    let subjective = &soap.subjective;
    let placeholder = config.history_placeholder.as_str();

    let objective = to_indented(&soap.objective, config.indent)?;
    let assessment_and_plan = to_indented(&soap.assessment_and_plan, config.indent)?;
    let orders =
        serde_json::to_string(&document.orders).map_err(|err| CodecError::Encode(err.to_string()))?;

    let blocks = [
        format!("{SOAP_MARKER}\n{PATIENT_LABEL} {}", soap.patient),
        format!("{REASON_LABEL} {}", subjective.chief_complaint),
        format!("{SUBJECTIVE_LABEL} {}", subjective.hpi),
        format!(
            "{FAMILY_HISTORY_LABEL} {}",
            or_placeholder(&subjective.family_history, placeholder)
        ),
        format!(
            "{SURGICAL_HISTORY_LABEL} {}",
            or_placeholder(&subjective.surgical_history, placeholder)
        ),
        format!(
            "{SOCIAL_HISTORY_LABEL} {}",
            or_placeholder(&subjective.social_history, placeholder)
        ),
        format!("{ROS_LABEL}:\n{}", subjective.ros),
        format!("{OBJECTIVE_LABEL} {objective}"),
        format!("{ASSESSMENT_PLAN_LABEL} {assessment_and_plan}"),
        format!("{PROCEDURE_MARKER}\n{}", document.procedure_text),
        format!("{ORDERS_MARKER} {orders}"),
    ];

    Ok(blocks.join("\n\n"))
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

fn to_indented<T: Serialize>(value: &T, indent: usize) -> Result<String, CodecError> {
    let spaces = " ".repeat(indent);
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(spaces.as_bytes()));
    value
        .serialize(&mut serializer)
        .map_err(|err| CodecError::Encode(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| CodecError::Encode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use soapnote_core::{AssessmentPlan, OrdersDocument, Problem, SoapFields, Subjective};

    fn sample() -> ClinicalDocument {
        let mut objective = serde_json::Map::new();
        objective.insert("vital_signs".to_string(), json!({ "BP": "120/80" }));

        ClinicalDocument {
            soap: SoapFields {
                patient: "John Doe".to_string(),
                subjective: Subjective {
                    chief_complaint: "Follow-up".to_string(),
                    hpi: "Feels better".to_string(),
                    family_history: String::new(),
                    surgical_history: "Cholecystectomy".to_string(),
                    social_history: "  ".to_string(),
                    ros: "CV: negative".to_string(),
                },
                objective,
                assessment_and_plan: AssessmentPlan {
                    problems: vec![Problem {
                        problem: "HTN".to_string(),
                        assessment: "stable".to_string(),
                        plan: "continue meds".to_string(),
                        ..Problem::default()
                    }],
                    follow_up: "2 weeks".to_string(),
                    ..AssessmentPlan::default()
                },
            },
            procedure_text: "Procedure Information\nType: none".to_string(),
            orders: OrdersDocument {
                orders: vec![json!({ "code": "99213" })],
                confirmed: true,
                ..OrdersDocument::default()
            },
            ..ClinicalDocument::default()
        }
    }

    #[test]
    fn emits_canonical_layout() {
        let raw = serialize_document(&sample()).expect("serialize");
        let expected = "$soap_notes -\n\
Patient: John Doe\n\n\
Reason for Visit - Follow-up\n\n\
Subjective - Feels better\n\n\
Family history discussed in this appointment - Not discussed\n\n\
Surgical history discussed in this appointment - Cholecystectomy\n\n\
Social history discussed in this appointment - Not discussed\n\n\
Review of Systems:\nCV: negative\n\n\
Objective - {\n  \"vital_signs\": {\n    \"BP\": \"120/80\"\n  }\n}\n\n\
Assessment and Plan - {\n  \"problems\": [\n    {\n      \"problem\": \"HTN\",\n      \"assessment\": \"stable\",\n      \"plan\": \"continue meds\"\n    }\n  ],\n  \"follow_up\": \"2 weeks\"\n}\n\n\
$procedure_notes -\nProcedure Information\nType: none\n\n\
$orders - {\"orders\":[{\"code\":\"99213\"}],\"confirmed\":true}";

        assert_eq!(raw, expected);
    }

    #[test]
    fn empty_document_keeps_every_label() {
        let raw = serialize_document(&ClinicalDocument::default()).expect("serialize");

        assert!(raw.starts_with("$soap_notes -\nPatient: \n\nReason for Visit - \n\n"));
        assert!(raw.contains("Objective - {}\n\n"));
        assert!(raw.contains("Assessment and Plan - {\n  \"problems\": [],\n  \"follow_up\": \"\"\n}"));
        assert!(raw.ends_with("$orders - {\"orders\":[],\"confirmed\":false}"));
    }

    #[test]
    fn config_controls_indent_and_placeholder() {
        let config = CodecConfig {
            indent: 4,
            history_placeholder: "Deferred".to_string(),
        };
        let raw = serialize_with_config(&sample(), &config).expect("serialize");

        assert!(raw.contains("Family history discussed in this appointment - Deferred"));
        assert!(raw.contains("Objective - {\n    \"vital_signs\""));
    }
}
