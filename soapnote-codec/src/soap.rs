//! Labeled-field extraction for the SOAP segment.
//!
//! Each field is captured independently: find its label, then read until the
//! earliest of the row's terminators (or the end of the segment). A missing
//! label yields an empty field.

use serde_json::{Map, Value};
use soapnote_core::{AssessmentPlan, SoapFields, Subjective};

use crate::diagnostics::{Decoded, FieldDiagnostic};
use crate::sanitize::decode_literal;
use crate::segment::earliest;

pub const PATIENT_LABEL: &str = "Patient:";
pub const REASON_LABEL: &str = "Reason for Visit -";
pub const SUBJECTIVE_LABEL: &str = "Subjective -";
pub const FAMILY_HISTORY_LABEL: &str = "Family history discussed in this appointment -";
pub const SURGICAL_HISTORY_LABEL: &str = "Surgical history discussed in this appointment -";
pub const SOCIAL_HISTORY_LABEL: &str = "Social history discussed in this appointment -";
pub const ROS_LABEL: &str = "Review of Systems";
pub const OBJECTIVE_LABEL: &str = "Objective -";
pub const ASSESSMENT_PLAN_LABEL: &str = "Assessment and Plan -";

const FAMILY_PREFIX: &str = "Family history discussed";
const SURGICAL_PREFIX: &str = "Surgical history discussed";
const SOCIAL_PREFIX: &str = "Social history discussed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapField {
    Patient,
    ChiefComplaint,
    Hpi,
    FamilyHistory,
    SurgicalHistory,
    SocialHistory,
    Ros,
    Objective,
    AssessmentAndPlan,
}

impl SoapField {
    pub fn name(self) -> &'static str {
        match self {
            SoapField::Patient => "patient",
            SoapField::ChiefComplaint => "chief_complaint",
            SoapField::Hpi => "hpi",
            SoapField::FamilyHistory => "family_history",
            SoapField::SurgicalHistory => "surgical_history",
            SoapField::SocialHistory => "social_history",
            SoapField::Ros => "ros",
            SoapField::Objective => "objective",
            SoapField::AssessmentAndPlan => "assessmentAndPlan",
        }
    }
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: SoapField,
    pub label: &'static str,
    /// Optional tokens skipped directly after the label, in order.
    pub skip: &'static [&'static str],
    /// The earliest match ends the capture. Empty means end of segment.
    pub terminators: &'static [&'static str],
}

/// Extraction table, in document order (indexed by `SoapField`).
///
/// The first terminator of each row is its documented boundary; the rest are
/// the labels of later rows, so an absent section does not swallow the next
/// one. The surgical row ends on a repeated surgical marker.
pub static FIELD_TABLE: [FieldRule; 9] = [
    FieldRule {
        field: SoapField::Patient,
        label: PATIENT_LABEL,
        skip: &[],
        terminators: &["\n"],
    },
    FieldRule {
        field: SoapField::ChiefComplaint,
        label: REASON_LABEL,
        skip: &[],
        terminators: &["\n\n", SUBJECTIVE_LABEL],
    },
    FieldRule {
        field: SoapField::Hpi,
        label: SUBJECTIVE_LABEL,
        skip: &[],
        terminators: &[
            FAMILY_PREFIX,
            SURGICAL_PREFIX,
            SOCIAL_PREFIX,
            ROS_LABEL,
            OBJECTIVE_LABEL,
            ASSESSMENT_PLAN_LABEL,
        ],
    },
    FieldRule {
        field: SoapField::FamilyHistory,
        label: FAMILY_HISTORY_LABEL,
        skip: &[],
        terminators: &[
            SURGICAL_PREFIX,
            SOCIAL_PREFIX,
            ROS_LABEL,
            OBJECTIVE_LABEL,
            ASSESSMENT_PLAN_LABEL,
        ],
    },
    FieldRule {
        field: SoapField::SurgicalHistory,
        label: SURGICAL_HISTORY_LABEL,
        skip: &[],
        terminators: &[
            SURGICAL_PREFIX,
            SOCIAL_PREFIX,
            ROS_LABEL,
            OBJECTIVE_LABEL,
            ASSESSMENT_PLAN_LABEL,
        ],
    },
    FieldRule {
        field: SoapField::SocialHistory,
        label: SOCIAL_HISTORY_LABEL,
        skip: &[],
        terminators: &[ROS_LABEL, OBJECTIVE_LABEL, ASSESSMENT_PLAN_LABEL],
    },
    FieldRule {
        field: SoapField::Ros,
        label: ROS_LABEL,
        skip: &["(ROS)", ":"],
        terminators: &[OBJECTIVE_LABEL, ASSESSMENT_PLAN_LABEL],
    },
    FieldRule {
        field: SoapField::Objective,
        label: OBJECTIVE_LABEL,
        skip: &[],
        terminators: &[ASSESSMENT_PLAN_LABEL],
    },
    FieldRule {
        field: SoapField::AssessmentAndPlan,
        label: ASSESSMENT_PLAN_LABEL,
        skip: &[],
        terminators: &[],
    },
];

pub fn rule_for(field: SoapField) -> &'static FieldRule {
    &FIELD_TABLE[field as usize]
}

/// Apply one table row to the SOAP text. Returns a trimmed slice.
pub fn capture<'a>(text: &'a str, rule: &FieldRule) -> &'a str {
    let Some(position) = text.find(rule.label) else {
        return "";
    };
    let mut rest = &text[position + rule.label.len()..];

    for token in rule.skip {
        let trimmed = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        if let Some(after) = trimmed.strip_prefix(token) {
            rest = after;
        }
    }

    let end = earliest(rest, rule.terminators).unwrap_or(rest.len());
    rest[..end].trim()
}

pub fn capture_field(text: &str, field: SoapField) -> &str {
    capture(text, rule_for(field))
}

pub fn parse_subjective(text: &str) -> Subjective {
    Subjective {
        chief_complaint: capture_field(text, SoapField::ChiefComplaint).to_string(),
        hpi: capture_field(text, SoapField::Hpi).to_string(),
        family_history: capture_field(text, SoapField::FamilyHistory).to_string(),
        surgical_history: capture_field(text, SoapField::SurgicalHistory).to_string(),
        social_history: capture_field(text, SoapField::SocialHistory).to_string(),
        ros: capture_field(text, SoapField::Ros).to_string(),
    }
}

pub fn parse_soap(text: &str) -> SoapFields {
    parse_soap_reporting(text, &mut Vec::new())
}

pub fn parse_soap_reporting(text: &str, diagnostics: &mut Vec<FieldDiagnostic>) -> SoapFields {
    let objective = decode_objective(capture_field(text, SoapField::Objective))
        .collapse(SoapField::Objective.name(), diagnostics);
    let assessment_and_plan =
        decode_assessment_plan(capture_field(text, SoapField::AssessmentAndPlan))
            .collapse(SoapField::AssessmentAndPlan.name(), diagnostics);

    SoapFields {
        patient: capture_field(text, SoapField::Patient).to_string(),
        subjective: parse_subjective(text),
        objective,
        assessment_and_plan,
    }
}

pub fn decode_objective(capture: &str) -> Decoded<Map<String, Value>> {
    match decode_embedded_object(capture) {
        Decoded::Parsed(Value::Object(map)) => Decoded::Parsed(map),
        Decoded::Parsed(_) => Decoded::Defaulted("objective is not an object".to_string()),
        Decoded::Absent => Decoded::Absent,
        Decoded::Defaulted(reason) => Decoded::Defaulted(reason),
    }
}

pub fn decode_assessment_plan(capture: &str) -> Decoded<AssessmentPlan> {
    match decode_embedded_object(capture) {
        Decoded::Parsed(value) => match serde_json::from_value::<AssessmentPlan>(value) {
            Ok(plan) => Decoded::Parsed(plan),
            Err(err) => Decoded::Defaulted(format!("unexpected shape: {err}")),
        },
        Decoded::Absent => Decoded::Absent,
        Decoded::Defaulted(reason) => Decoded::Defaulted(reason),
    }
}

/// Slice from the first `{` to the last `}` and decode it.
fn decode_embedded_object(capture: &str) -> Decoded<Value> {
    if capture.trim().is_empty() {
        return Decoded::Absent;
    }

    let (Some(start), Some(end)) = (capture.find('{'), capture.rfind('}')) else {
        return Decoded::Defaulted("no braced object".to_string());
    };
    if end < start {
        return Decoded::Defaulted("no braced object".to_string());
    }

    match decode_literal(&capture[start..=end]) {
        Ok(value) => Decoded::Parsed(value),
        Err(err) => Decoded::Defaulted(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOTE: &str = "Patient: Jane Roe\n\n\
Reason for Visit - Annual physical\n\n\
Subjective - No complaints.\nSleeping well.\n\n\
Family history discussed in this appointment - Mother with T2DM\n\n\
Surgical history discussed in this appointment - Appendectomy 2010\n\n\
Social history discussed in this appointment - Non-smoker\n\n\
Review of Systems (ROS): Negative except as noted\n\n\
Objective - {\"vital_signs\": {\"HR\": 64}}\n\n\
Assessment and Plan - {'problems': [], 'follow_up': '1 year'}";

    #[test]
    fn table_is_indexed_by_field() {
        for (index, rule) in FIELD_TABLE.iter().enumerate() {
            assert_eq!(rule.field as usize, index);
        }
    }

    #[test]
    fn patient_reads_to_end_of_line() {
        assert_eq!(capture_field(NOTE, SoapField::Patient), "Jane Roe");
    }

    #[test]
    fn chief_complaint_stops_at_blank_line() {
        assert_eq!(capture_field(NOTE, SoapField::ChiefComplaint), "Annual physical");
    }

    #[test]
    fn hpi_keeps_multiple_lines() {
        assert_eq!(capture_field(NOTE, SoapField::Hpi), "No complaints.\nSleeping well.");
    }

    #[test]
    fn history_rows() {
        assert_eq!(capture_field(NOTE, SoapField::FamilyHistory), "Mother with T2DM");
        assert_eq!(capture_field(NOTE, SoapField::SurgicalHistory), "Appendectomy 2010");
        assert_eq!(capture_field(NOTE, SoapField::SocialHistory), "Non-smoker");
    }

    #[test]
    fn surgical_history_ends_at_repeated_surgical_marker() {
        let text = "Surgical history discussed in this appointment - first\n\
Surgical history discussed in this appointment - second";
        assert_eq!(capture_field(text, SoapField::SurgicalHistory), "first");
    }

    #[test]
    fn ros_label_variants() {
        assert_eq!(capture_field(NOTE, SoapField::Ros), "Negative except as noted");
        assert_eq!(
            capture_field("Review of Systems:\nCV: ok\n\nObjective - {}", SoapField::Ros),
            "CV: ok"
        );
        assert_eq!(
            capture_field("Review of Systems\nGI: ok", SoapField::Ros),
            "GI: ok"
        );
    }

    #[test]
    fn objective_and_plan_decode_both_dialects() {
        let soap = parse_soap(NOTE);
        assert_eq!(soap.objective.get("vital_signs"), Some(&json!({ "HR": 64 })));
        assert_eq!(soap.assessment_and_plan.follow_up, "1 year");
        assert!(soap.assessment_and_plan.problems.is_empty());
    }

    #[test]
    fn missing_labels_default_to_empty() {
        let soap = parse_soap("");
        assert_eq!(soap.patient, "");
        assert_eq!(soap.subjective, Subjective::default());
        assert!(soap.objective.is_empty());
        assert_eq!(soap.assessment_and_plan, AssessmentPlan::default());
    }

    #[test]
    fn absent_section_does_not_swallow_the_next() {
        let text = "Subjective - Cough\n\nSocial history discussed in this appointment - Smoker";
        let subjective = parse_subjective(text);
        assert_eq!(subjective.hpi, "Cough");
        assert_eq!(subjective.family_history, "");
        assert_eq!(subjective.social_history, "Smoker");
    }

    #[test]
    fn truncated_objective_is_contained() {
        let text = "Objective - {\"vital_signs\": {\"BP\": \"120/\n\n\
Assessment and Plan - {\"problems\": [{\"problem\": \"HTN\"}], \"follow_up\": \"\"}";
        let mut diagnostics = Vec::new();
        let soap = parse_soap_reporting(text, &mut diagnostics);

        assert!(soap.objective.is_empty());
        assert_eq!(soap.assessment_and_plan.problems[0].problem, "HTN");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].field, "objective");
    }

    #[test]
    fn non_object_objective_is_defaulted() {
        assert!(matches!(decode_objective("plain text"), Decoded::Defaulted(_)));
        assert_eq!(decode_objective("   "), Decoded::Absent);
    }

    #[test]
    fn python_none_problems_keep_follow_up() {
        let mut diagnostics = Vec::new();
        let soap = parse_soap_reporting(
            "Assessment and Plan - {'problems': None, 'follow_up': '2 weeks', 'note': 'keep'}",
            &mut diagnostics,
        );
        let plan = soap.assessment_and_plan;

        assert!(diagnostics.is_empty());
        assert!(plan.problems.is_empty());
        assert_eq!(plan.follow_up, "2 weeks");
        assert_eq!(plan.extra.get("note"), Some(&json!("keep")));
    }

    #[test]
    fn unbraced_plan_is_defaulted() {
        let decoded = decode_assessment_plan("see previous note");
        assert!(matches!(decoded, Decoded::Defaulted(_)));
    }
}
