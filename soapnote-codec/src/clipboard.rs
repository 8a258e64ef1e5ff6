//! Plain-text rendering for copy actions. Never used for persistence.

use serde_json::{Map, Value};
use soapnote_core::{AssessmentPlan, EncounterMeta, ProcedureDocument, ProcedureLine, Subjective};

use crate::procedure::render_sections;

/// Format one note section for the clipboard, keyed by its display title.
///
/// Returns an empty string for `null` input.
pub fn format_for_clipboard(title: &str, data: &Value) -> String {
    if data.is_null() {
        return String::new();
    }

    match title {
        "Subjective" => serde_json::from_value::<Subjective>(data.clone())
            .map(|subjective| format_subjective(&subjective))
            .unwrap_or_else(|_| format_generic(data)),
        "Objective" => data
            .as_object()
            .map(format_objective)
            .unwrap_or_else(|| format_generic(data)),
        "Assessment & Plan" => serde_json::from_value::<AssessmentPlan>(data.clone())
            .map(|plan| format_assessment_plan(&plan))
            .unwrap_or_else(|_| format_generic(data)),
        _ => format_generic(data),
    }
}

pub fn format_subjective(subjective: &Subjective) -> String {
    let fields = [
        ("Chief Complaint", &subjective.chief_complaint),
        ("History of Present Illness", &subjective.hpi),
        ("Family History", &subjective.family_history),
        ("Surgical History", &subjective.surgical_history),
        ("Social History", &subjective.social_history),
        ("Review of Systems", &subjective.ros),
    ];

    fields
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}:\n{}", value.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_objective(objective: &Map<String, Value>) -> String {
    objective
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| {
            let heading = humanize_key(key);
            match value {
                Value::Object(_) | Value::Array(_) => {
                    format!("{heading}:\n{}", render_lines(value, 0).join("\n"))
                }
                scalar => format!("{heading}:\n{}", scalar_text(scalar)),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_assessment_plan(plan: &AssessmentPlan) -> String {
    let mut blocks: Vec<String> = plan
        .problems
        .iter()
        .enumerate()
        .map(|(index, problem)| {
            format!(
                "Problem {}: {}\nAssessment: {}\nPlan: {}",
                index + 1,
                problem.problem.trim(),
                problem.assessment.trim(),
                problem.plan.trim()
            )
        })
        .collect();

    if !plan.follow_up.trim().is_empty() {
        blocks.push(format!("Follow-up:\n{}", plan.follow_up.trim()));
    }

    blocks.join("\n\n")
}

/// Procedure sections with placeholders filled from `meta` when supplied.
pub fn format_procedure(document: &ProcedureDocument, meta: Option<&EncounterMeta>) -> String {
    render_sections(document, meta)
        .into_iter()
        .map(|section| {
            let mut lines = vec![section.title];
            lines.extend(section.lines.into_iter().map(|line| match line {
                ProcedureLine::Field { label, value } => format!("{label}: {value}"),
                ProcedureLine::Narrative { text } => text,
            }));
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_generic(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Object(_) | Value::Array(_) => render_lines(value, 0).join("\n"),
        scalar => scalar_text(scalar),
    }
}

fn render_lines(value: &Value, depth: usize) -> Vec<String> {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let label = humanize_key(key);
                match child {
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{indent}{label}:"));
                        lines.extend(render_lines(child, depth + 1));
                    }
                    scalar => lines.push(format!("{indent}{label}: {}", scalar_text(scalar))),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => lines.extend(render_lines(item, depth)),
                    scalar => lines.push(format!("{indent}- {}", scalar_text(scalar))),
                }
            }
        }
        scalar => lines.push(format!("{indent}{}", scalar_text(scalar))),
    }

    lines
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// `vital_signs` -> `Vital Signs`. Acronyms such as `BP` are left as written.
fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
