//! Titled sections of the procedure note.

use soapnote_core::{
    EncounterMeta, ProcedureDocument, ProcedureLine, RenderedSection, Section, SectionKind,
    CALLOUT_TITLE,
};
use tracing::debug;

/// Recognized section titles. Matched exactly against a trimmed line.
pub const SECTION_TITLES: [&str; 7] = [
    "Procedure Information",
    "Anesthesia / Analgesia",
    "Preparation & Equipment",
    CALLOUT_TITLE,
    "Post-Procedure Assessment",
    "Discharge Instructions",
    "Provider Attestation",
];

/// Title of the section holding lines that precede the first recognized title.
pub const IMPLICIT_TITLE: &str = "Procedure Notes";

const BOILERPLATE: [&str; 3] = ["$procedure_notes -", "procedure_notes -", "procedure note"];

pub fn sectionize(text: &str) -> ProcedureDocument {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || is_boilerplate(line) {
            continue;
        }

        if let Some(title) = SECTION_TITLES.iter().find(|title| **title == line) {
            current = Some(open_section(&mut sections, title));
            continue;
        }

        let index = match current {
            Some(index) => index,
            None => {
                sections.push(Section {
                    title: IMPLICIT_TITLE.to_string(),
                    lines: Vec::new(),
                    kind: SectionKind::Fielded,
                });
                let index = sections.len() - 1;
                current = Some(index);
                index
            }
        };
        sections[index].lines.push(line.to_string());
    }

    debug!(sections = sections.len(), "sectionized procedure note");
    ProcedureDocument { sections }
}

fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    BOILERPLATE.iter().any(|placeholder| lower == *placeholder)
}

/// Start a section, or resume the callout when its title repeats.
fn open_section(sections: &mut Vec<Section>, title: &str) -> usize {
    let kind = if title == CALLOUT_TITLE {
        SectionKind::Callout
    } else {
        SectionKind::Fielded
    };

    if kind == SectionKind::Callout {
        if let Some(index) = sections
            .iter()
            .position(|section| section.kind == SectionKind::Callout)
        {
            return index;
        }
    }

    sections.push(Section {
        title: title.to_string(),
        lines: Vec::new(),
        kind,
    });
    sections.len() - 1
}

/// Split on the first `:`. Lines without one are narrative.
pub fn classify_line(line: &str) -> ProcedureLine {
    match line.split_once(':') {
        Some((label, value)) => ProcedureLine::Field {
            label: label.trim().to_string(),
            value: value.trim().to_string(),
        },
        None => ProcedureLine::Narrative {
            text: line.to_string(),
        },
    }
}

/// Replace an "insert ..." date & time value with the encounter's times.
pub fn substitute_placeholder(label: &str, value: &str, meta: Option<&EncounterMeta>) -> String {
    let Some(meta) = meta else {
        return value.to_string();
    };

    if label.to_lowercase().contains("date & time") && value.to_lowercase().contains("insert") {
        meta.display_range()
    } else {
        value.to_string()
    }
}

pub fn render_section(section: &Section, meta: Option<&EncounterMeta>) -> RenderedSection {
    let lines = match section.kind {
        SectionKind::Callout => section
            .lines
            .iter()
            .map(|line| ProcedureLine::Narrative { text: line.clone() })
            .collect(),
        SectionKind::Fielded => section
            .lines
            .iter()
            .map(|line| match classify_line(line) {
                ProcedureLine::Field { label, value } => {
                    let value = substitute_placeholder(&label, &value, meta);
                    ProcedureLine::Field { label, value }
                }
                narrative => narrative,
            })
            .collect(),
    };

    RenderedSection {
        title: section.title.clone(),
        kind: section.kind,
        lines,
    }
}

pub fn render_sections(
    document: &ProcedureDocument,
    meta: Option<&EncounterMeta>,
) -> Vec<RenderedSection> {
    document
        .sections
        .iter()
        .map(|section| render_section(section, meta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> EncounterMeta {
        EncounterMeta::new("1/1/2025", "9:00 AM", "9:30 AM")
    }

    #[test]
    fn two_titled_sections() {
        let document =
            sectionize("Procedure Information\nType: none\n\nProcedure Description\nMade an incision.");

        assert_eq!(document.sections.len(), 2);

        let info = &document.sections[0];
        assert_eq!(info.title, "Procedure Information");
        assert_eq!(info.kind, SectionKind::Fielded);
        assert_eq!(info.lines, vec!["Type: none".to_string()]);

        let description = &document.sections[1];
        assert_eq!(description.title, "Procedure Description");
        assert_eq!(description.kind, SectionKind::Callout);
        assert_eq!(description.lines, vec!["Made an incision.".to_string()]);

        let rendered = render_sections(&document, None);
        assert_eq!(
            rendered[0].lines,
            vec![ProcedureLine::Field {
                label: "Type".to_string(),
                value: "none".to_string()
            }]
        );
        assert_eq!(
            rendered[1].lines,
            vec![ProcedureLine::Narrative {
                text: "Made an incision.".to_string()
            }]
        );
    }

    #[test]
    fn leading_lines_go_to_implicit_section() {
        let document = sectionize("PROCEDURE NOTE\nPerformed at bedside\nProvider Attestation\nI was present.");

        assert_eq!(document.sections[0].title, IMPLICIT_TITLE);
        assert_eq!(document.sections[0].lines, vec!["Performed at bedside".to_string()]);
        assert_eq!(document.sections[1].title, "Provider Attestation");
    }

    #[test]
    fn boilerplate_lines_are_dropped() {
        let document = sectionize("$procedure_notes -\n  Procedure_Notes -  \nProcedure Information");
        assert_eq!(document.sections.len(), 1);
        assert!(document.sections[0].lines.is_empty());
    }

    #[test]
    fn titles_are_case_sensitive() {
        let document = sectionize("procedure information\nType: none");
        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.sections[0].title, IMPLICIT_TITLE);
        assert_eq!(document.sections[0].lines.len(), 2);
    }

    #[test]
    fn only_one_callout_section() {
        let document = sectionize(
            "Procedure Description\nFirst part.\nDischarge Instructions\nRest.\nProcedure Description\nSecond part.",
        );

        let callouts: Vec<_> = document
            .sections
            .iter()
            .filter(|section| section.kind == SectionKind::Callout)
            .collect();
        assert_eq!(callouts.len(), 1);
        assert_eq!(
            callouts[0].lines,
            vec!["First part.".to_string(), "Second part.".to_string()]
        );
    }

    #[test]
    fn label_splits_on_first_colon_only() {
        assert_eq!(
            classify_line("Start time: 09:15"),
            ProcedureLine::Field {
                label: "Start time".to_string(),
                value: "09:15".to_string()
            }
        );
    }

    #[test]
    fn date_placeholder_is_filled_from_encounter() {
        let meta = meta();
        assert_eq!(
            substitute_placeholder("Date & Time", "insert date here", Some(&meta)),
            "1/1/2025, 9:00 AM \u{2013} 9:30 AM"
        );
        assert_eq!(
            substitute_placeholder("Date & Time", "insert date here", None),
            "insert date here"
        );
        assert_eq!(
            substitute_placeholder("Date & Time", "12/31/2024", Some(&meta)),
            "12/31/2024"
        );
    }

    #[test]
    fn substitution_does_not_touch_section_data() {
        let document = sectionize("Procedure Information\nDate & Time: [Insert date]");
        let meta = meta();
        let rendered = render_sections(&document, Some(&meta));

        assert_eq!(
            rendered[0].lines[0],
            ProcedureLine::Field {
                label: "Date & Time".to_string(),
                value: "1/1/2025, 9:00 AM \u{2013} 9:30 AM".to_string()
            }
        );
        assert_eq!(document.sections[0].lines[0], "Date & Time: [Insert date]");
    }
}
