//! Assembles the final per-person record and its advisory notes.
//!
//! Notes are advisory only: a record is always produced, however little was
//! found.

use tracing::debug;

use edutrace_shared::{DegreeLevel, DegreeRecord, PersonRecord};

pub const NOTE_NO_TEXT: &str = "No text provided";
pub const NOTE_NO_NAME: &str = "Could not extract name";
pub const NOTE_NO_SECTION: &str = "No education section found";
pub const NOTE_NO_DEGREES: &str = "No degrees found in education section";
pub const NOTE_CROSS_LEVEL: &str = "VALIDATION: Same institution appears for multiple degree levels";

/// How the education section lookup went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    /// No start header, or a header with nothing under it.
    Missing,
    /// A non-empty span was scanned.
    Scanned,
}

/// Everything the scan produced for one document.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub document_id: String,
    pub name: Option<String>,
    pub section: SectionOutcome,
    pub degrees: Vec<DegreeRecord>,
}

/// Build the `PersonRecord`, attaching notes for whatever is missing or odd.
pub fn assemble(assembly: Assembly, validate: bool) -> PersonRecord {
    let mut notes = Vec::new();

    if assembly.name.is_none() {
        notes.push(NOTE_NO_NAME.to_string());
    }

    match assembly.section {
        SectionOutcome::Missing => notes.push(NOTE_NO_SECTION.to_string()),
        SectionOutcome::Scanned if assembly.degrees.is_empty() => {
            notes.push(NOTE_NO_DEGREES.to_string());
        }
        SectionOutcome::Scanned => {}
    }

    if validate {
        let repeated = cross_level_institutions(&assembly.degrees);
        if !repeated.is_empty() {
            debug!(document = %assembly.document_id, ?repeated, "institution repeated across levels");
            notes.push(format!("{NOTE_CROSS_LEVEL}: {}", repeated.join(", ")));
        }
    }

    PersonRecord {
        name: assembly.name.unwrap_or_default(),
        source_document_id: assembly.document_id,
        degrees: assembly.degrees,
        notes,
    }
}

/// Record for a document with no usable text.
pub fn empty_record(document_id: impl Into<String>) -> PersonRecord {
    PersonRecord {
        source_document_id: document_id.into(),
        notes: vec![NOTE_NO_TEXT.to_string()],
        ..PersonRecord::default()
    }
}

/// Institutions attached to more than one degree level, compared
/// case-insensitively, in order of first appearance.
pub fn cross_level_institutions(degrees: &[DegreeRecord]) -> Vec<String> {
    let mut seen: Vec<(String, &str, Vec<DegreeLevel>)> = Vec::new();

    for degree in degrees {
        let Some(institution) = degree.institution.as_deref() else {
            continue;
        };
        let key = institution.to_lowercase();
        match seen.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, levels)) => {
                if !levels.contains(&degree.level) {
                    levels.push(degree.level);
                }
            }
            None => seen.push((key, institution, vec![degree.level])),
        }
    }

    seen.into_iter()
        .filter(|(_, _, levels)| levels.len() > 1)
        .map(|(_, display, _)| display.to_string())
        .collect()
}
