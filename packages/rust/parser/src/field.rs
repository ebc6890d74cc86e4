//! Field-of-study extraction.
//!
//! On the degree line the field is read relative to the degree token, so the
//! patterns are compiled per degree label. Off the degree line only an
//! explicitly labeled field ("Concentration:", "Academic Area:") is accepted.

use std::sync::LazyLock;

use regex::Regex;

use edutrace_shared::DegreeLevel;

use crate::context;
use crate::degree::DegreeTable;

/// Words that mark a candidate as an institution rather than a field.
const INSTITUTION_WORDS: &[&str] = &["university", "college", "institute", "school"];

/// Words that mark a candidate as an honors note rather than a field.
const HONORS_WORDS: &[&str] = &["summa", "magna", "cum laude", "honors"];

/// Field patterns anchored on one degree label.
#[derive(Debug)]
struct LabelPatterns {
    label: &'static str,
    /// "Licentiaat in de Psychologie"
    dutch: Regex,
    /// "Ph.D. in Marketing", "MBA in Strategy and Marketing"
    in_of: Regex,
    /// "Ph.D., Marketing, Stanford University"
    comma: Regex,
    /// "Ph.D. Management and Organizations, Kellogg School"
    space: Regex,
    /// "B.A., M.A., Economics, 1999"
    shared: Regex,
}

impl LabelPatterns {
    fn new(label: &'static str) -> Self {
        let anchor = anchor_for(label);
        let compile = |body: &str| {
            Regex::new(&format!("(?i){anchor}{body}")).expect("valid field regex")
        };
        Self {
            label,
            dutch: compile(r"\s+in\s+de\s+([A-Za-z]+)"),
            in_of: compile(
                r"\s+(?:in|of)\s+([A-Za-z][A-Za-z\s&]+?)(?:\s*,|\s+\d{4}|\s+[A-Z][a-z]+\s+University|\s+[A-Z][a-z]+\s+School|\s*$)",
            ),
            comma: compile(r"\s*,\s*([A-Za-z\s&]+?)(?:,|\s+\d{4}|\s*$)"),
            space: compile(r"\s+([A-Za-z][A-Za-z\s&]+?)(?:,|\s+\d{4})"),
            shared: compile(
                r"\s*,\s*(?:M\.?A\.?|B\.?A\.?|M\.?S\.?|B\.?S\.?)\s*,\s*([A-Za-z\s&]+?)(?:,|\s+\d{4})",
            ),
        }
    }
}

/// A pattern matching the label with or without its dots: `Ph.D.` → `\bP\.?\s*h\.?\s*D\.?`.
fn anchor_for(label: &str) -> String {
    let letters: Vec<String> = label
        .chars()
        .filter(|c| *c != '.')
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    format!(r"\b{}\.?", letters.join(r"\.?\s*"))
}

static BY_LABEL: LazyLock<Vec<LabelPatterns>> = LazyLock::new(|| {
    DegreeTable::standard()
        .labels()
        .into_iter()
        .map(LabelPatterns::new)
        .collect()
});

/// Spelled-out degree names followed by a comma and the field.
static FULL_NAME_RES: LazyLock<Vec<(DegreeLevel, Regex)>> = LazyLock::new(|| {
    [
        (DegreeLevel::Phd, r"Doctor\s+of\s+Philosophy\s*,\s*([A-Za-z\s&]+?)(?:\s*$|,|\d{4})"),
        (
            DegreeLevel::Masters,
            r"Master\s+of\s+(?:Science|Arts|Business(?:\s+Administration)?)\s*,\s*([A-Za-z\s&]+?)(?:\s*$|,|\d{4})",
        ),
        (
            DegreeLevel::Undergrad,
            r"Bachelor\s+of\s+(?:Science|Arts|Technology|Engineering)\s*,\s*([A-Za-z\s&]+?)(?:\s*$|,|\d{4})",
        ),
    ]
    .into_iter()
    .map(|(level, p)| (level, Regex::new(&format!("(?i){p}")).expect("valid field regex")))
    .collect()
});

static ACADEMIC_AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[•*-]\s*)?Academic\s*Area[:\s]+([A-Za-z,\s&]+?)(?:\s*$|•)")
        .expect("valid field regex")
});

static LABELED_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[•*-]\s*)?(?:Concentration|Major|Specialization|Field)[:\s]+([A-Za-z\s&]+?)(?:\s*$|,|\d{4})",
    )
    .expect("valid field regex")
});

static LEADING_IN_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:in|of)\s+").expect("valid field regex"));

static TRAILING_FROM_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:from|at)\s*$").expect("valid field regex"));

static COMMA_SPACING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("valid field regex"));

static AMPERSAND_SPACING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*&\s*").expect("valid field regex"));

fn mentions_any(candidate: &str, words: &[&str]) -> bool {
    let lower = candidate.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

fn clean_field(field: &str) -> String {
    let field = LEADING_IN_OF_RE.replace(field, "");
    let field = TRAILING_FROM_AT_RE.replace(&field, "");
    field.trim_matches([' ', ',', '.']).to_string()
}

/// First capture of `re` in `line`, trimmed.
fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// The part of a candidate before any institution or school it runs into.
/// `None` when the candidate starts with one ("INSEAD", "KU Leuven").
fn before_named_place(candidate: &str) -> Option<&str> {
    let Some(place) = context::institution(candidate).or_else(|| context::school(candidate)) else {
        return Some(candidate);
    };
    let first = place.split(" / ").next().unwrap_or_default();
    match candidate.find(first) {
        Some(idx) if idx > 0 => Some(candidate[..idx].trim_end()),
        _ => None,
    }
}

/// Accept a candidate if its length is within bounds and it names no institution.
fn accept(candidate: &str, max_len: usize, reject: &[&[&str]]) -> Option<String> {
    let candidate = before_named_place(candidate)?;
    let len = candidate.chars().count();
    if len <= 2 || len >= max_len {
        return None;
    }
    if reject.iter().any(|words| mentions_any(candidate, words)) {
        return None;
    }
    let cleaned = clean_field(candidate);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Field of study stated on the degree line itself for the degree `label`.
pub fn field_on_line(line: &str, label: &str, level: DegreeLevel) -> Option<String> {
    let patterns = BY_LABEL.iter().find(|p| p.label == label);

    if let Some(p) = patterns {
        if let Some(field) = capture(&p.dutch, line).filter(|f| f.chars().count() > 2) {
            return Some(field.to_string());
        }
        if let Some(field) = capture(&p.in_of, line)
            .map(|f| f.trim_end_matches(','))
            .and_then(|f| accept(f, 60, &[]))
        {
            return Some(field);
        }
        if let Some(field) =
            capture(&p.comma, line).and_then(|f| accept(f, 50, &[INSTITUTION_WORDS, HONORS_WORDS]))
        {
            return Some(field);
        }
        if let Some(field) =
            capture(&p.space, line).and_then(|f| accept(f, 50, &[INSTITUTION_WORDS, HONORS_WORDS]))
        {
            return Some(field);
        }
        if let Some(field) =
            capture(&p.shared, line).and_then(|f| accept(f, 50, &[INSTITUTION_WORDS]))
        {
            return Some(field);
        }
    }

    FULL_NAME_RES
        .iter()
        .filter(|(lvl, _)| *lvl == level)
        .find_map(|(_, re)| capture(re, line).and_then(|f| accept(f, 50, &[INSTITUTION_WORDS])))
}

/// An explicitly labeled field on one of the `window` lines following a degree.
pub fn labeled_field<S: AsRef<str>>(window: &[S]) -> Option<String> {
    window.iter().find_map(|line| {
        let line: &str = line.as_ref();
        let line = line.trim();
        if line.chars().count() < 5 {
            return None;
        }

        if let Some(area) = capture(&ACADEMIC_AREA_RE, line) {
            let area = area.trim_end_matches([',', '.']);
            let area = COMMA_SPACING_RE.replace_all(area, ", ");
            let area = AMPERSAND_SPACING_RE.replace_all(&area, " & ");
            if area.chars().count() > 2 {
                return Some(area.into_owned());
            }
        }

        capture(&LABELED_FIELD_RE, line)
            .filter(|f| (3..50).contains(&f.chars().count()))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use DegreeLevel::{Masters, Phd, Undergrad};

    #[test]
    fn degree_in_field() {
        assert_eq!(
            field_on_line("Ph.D. in Marketing, Northwestern University, 2010", "Ph.D.", Phd),
            Some("Marketing".into())
        );
        assert_eq!(
            field_on_line("MBA in Strategy and Marketing", "MBA", Masters),
            Some("Strategy and Marketing".into())
        );
    }

    #[test]
    fn degree_comma_field() {
        assert_eq!(
            field_on_line("MBA, Strategy and Marketing", "MBA", Masters),
            Some("Strategy and Marketing".into())
        );
        assert_eq!(
            field_on_line("B.A., Political Science and Economics, University of Michigan", "B.A.", Undergrad),
            Some("Political Science and Economics".into())
        );
    }

    #[test]
    fn comma_candidate_naming_institution_is_rejected() {
        assert_eq!(field_on_line("Ph.D., Stanford University, 2008", "Ph.D.", Phd), None);
        assert_eq!(field_on_line("B.A., summa cum laude, 1999", "B.A.", Undergrad), None);
    }

    #[test]
    fn curated_institution_is_never_a_field() {
        assert_eq!(field_on_line("MBA, INSEAD, 2005", "MBA", Masters), None);
        assert_eq!(field_on_line("Licentiaat, KU Leuven, 2006", "Licentiaat", Masters), None);
        assert_eq!(field_on_line("B.A., MIT, 1999", "B.A.", Undergrad), None);
        assert_eq!(field_on_line("MBA, Wharton School, 2004", "MBA", Masters), None);
    }

    #[test]
    fn field_stops_where_institution_starts() {
        assert_eq!(
            field_on_line("B.A. Economics Duke University, 1999", "B.A.", Undergrad),
            Some("Economics".into())
        );
    }

    #[test]
    fn degree_space_field_before_school() {
        assert_eq!(
            field_on_line("Ph.D. Management and Organizations, Kellogg School", "Ph.D.", Phd),
            Some("Management and Organizations".into())
        );
    }

    #[test]
    fn field_shared_by_two_degrees() {
        assert_eq!(
            field_on_line("B.A., M.A., Economics, 1999", "B.A.", Undergrad),
            Some("Economics".into())
        );
        assert_eq!(
            field_on_line("B.A., M.A., Economics, 1999", "M.A.", Masters),
            Some("Economics".into())
        );
    }

    #[test]
    fn dutch_in_de_field() {
        assert_eq!(
            field_on_line("Licentiaat in de Psychologie, KU Leuven", "Licentiaat", Masters),
            Some("Psychologie".into())
        );
    }

    #[test]
    fn spelled_out_degree_field() {
        assert_eq!(
            field_on_line("Doctor of Philosophy, Marketing", "Ph.D.", Phd),
            Some("Marketing".into())
        );
        assert_eq!(
            field_on_line("Bachelor of Technology, Mechanical Engineering", "B.Tech.", Undergrad),
            Some("Mechanical Engineering".into())
        );
    }

    #[test]
    fn year_only_line_has_no_field() {
        assert_eq!(field_on_line("Ph.D., 2008-2012", "Ph.D.", Phd), None);
        assert_eq!(field_on_line("Ph.D.", "Ph.D.", Phd), None);
    }

    #[test]
    fn anchor_accepts_dotless_form() {
        assert_eq!(
            field_on_line("PhD in Economics", "Ph.D.", Phd),
            Some("Economics".into())
        );
    }

    #[test]
    fn labeled_concentration_in_window() {
        let window = ["Stanford University", "Concentration: Experimental Psychology"];
        assert_eq!(labeled_field(&window), Some("Experimental Psychology".into()));
    }

    #[test]
    fn academic_area_spacing_is_fixed() {
        let window = ["AcademicArea: Operations,Information&Technology"];
        assert_eq!(
            labeled_field(&window),
            Some("Operations, Information & Technology".into())
        );
    }

    #[test]
    fn unlabeled_prose_is_not_a_field() {
        let window = ["My advisor was in the field of marketing science"];
        assert_eq!(labeled_field(&window), None);
    }
}
