//! Education section locator.
//!
//! The span runs from the line after the first education header to the line
//! before the first later non-education header, or to the end of the text.

use std::sync::LazyLock;

use regex::Regex;

/// Start/stop header tables.
#[derive(Debug)]
pub struct SectionHeaders {
    start: Vec<Regex>,
    stop: Vec<Regex>,
}

/// The located education span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationSection<'a> {
    /// The header line that opened the section, trimmed.
    pub header: &'a str,
    /// Non-empty trimmed lines between the headers.
    pub lines: Vec<&'a str>,
}

impl EducationSection<'_> {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid header regex"))
        .collect()
}

static STANDARD: LazyLock<SectionHeaders> = LazyLock::new(|| SectionHeaders {
    start: compile(&[
        r"^EDUCATION\s*[:.]?\s*$",
        r"^EDUCATIONAL\s+BACKGROUND\s*[:.]?\s*$",
        r"^EARNED\s+DEGREES\s*[:.]?\s*$",
        r"^I\.\s*EARNED\s+DEGREES",
        r"^DEGREES\s*[:.]?\s*$",
        r"^ACADEMIC\s+BACKGROUND\s*[:.]?\s*$",
        r"^EMPLOYMENT\s+AND\s+EDUCATION\s*[:.]?\s*$",
    ]),
    stop: compile(&[
        r"^EXPERIENCE",
        r"^EMPLOYMENT",
        r"^PROFESSIONAL\s+EXPERIENCE",
        r"^POSITIONS",
        r"^ACADEMIC\s+POSITIONS",
        r"^PUBLICATIONS",
        r"^RESEARCH",
        r"^TEACHING",
        r"^AWARDS",
        r"^HONORS",
        r"^GRANTS",
        r"^SERVICE",
        r"^FELLOWSHIPS",
        r"^SELECTED\s+PAPERS",
        r"^II\.",
        r"^III\.",
    ]),
});

/// Dot leaders or a trailing page number mark a table-of-contents entry.
static TOC_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.\.\.|\.\s*\d+\s*$").expect("valid TOC regex"));

impl SectionHeaders {
    /// The built-in header tables.
    pub fn standard() -> &'static SectionHeaders {
        &STANDARD
    }

    /// Whether a trimmed line opens the education section.
    pub fn is_start(&self, line: &str) -> bool {
        !TOC_ENTRY_RE.is_match(line) && self.start.iter().any(|re| re.is_match(line))
    }

    /// Whether a trimmed line opens a non-education section.
    pub fn is_stop(&self, line: &str) -> bool {
        self.stop.iter().any(|re| re.is_match(line))
    }

    /// Locate the education span in `text`. `None` when no start header exists.
    pub fn locate<'a>(&self, text: &'a str) -> Option<EducationSection<'a>> {
        let mut lines = text.lines().map(str::trim);

        let header = lines.by_ref().find(|line| self.is_start(line))?;

        let body = lines
            .take_while(|line| line.is_empty() || !self.is_stop(line))
            .filter(|line| !line.is_empty())
            .collect();

        Some(EducationSection {
            header,
            lines: body,
        })
    }
}
