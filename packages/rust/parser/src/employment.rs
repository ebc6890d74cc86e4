//! Employment-line gate.
//!
//! Lines that read like job titles or tenure timelines are skipped as context
//! sources so an employer is never captured as an institution. A degree token
//! on the same line always wins: such a line is treated as education.

use std::sync::LazyLock;

use regex::Regex;

use crate::degree::DegreeTable;

/// Ordered employment signal patterns.
#[derive(Debug)]
pub struct EmploymentRules {
    patterns: Vec<Regex>,
}

static STANDARD: LazyLock<EmploymentRules> = LazyLock::new(|| {
    let patterns = [
        r"\bProfessor\b",
        r"\bAssistant\s+Professor\b",
        r"\bAssociate\s+Professor\b",
        r"\bLecturer\b",
        r"\bDirector\b",
        r"\bChair\b",
        r"\bManager\b",
        r"\bConsultant\b",
        r"\bPresent\b",
        r"\b\d{4}\s*[-–—]\s*(?:Present|\d{4})\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid employment regex"))
    .collect();

    EmploymentRules { patterns }
});

impl EmploymentRules {
    /// The built-in employment signals.
    pub fn standard() -> &'static EmploymentRules {
        &STANDARD
    }

    /// Whether any employment signal appears on `line`, ignoring degree tokens.
    pub fn has_signal(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(line))
    }
}

/// Whether `line` is an employment entry rather than an education entry.
pub fn is_employment(line: &str, employment: &EmploymentRules, degrees: &DegreeTable) -> bool {
    employment.has_signal(line) && !degrees.has_degree(line)
}
