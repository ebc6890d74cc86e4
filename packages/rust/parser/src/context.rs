//! Institution, school, and year extraction, plus the carried pending context.
//!
//! Institution and school tables are ordered rule lists; the first rule that
//! matches wins, so curated names sit above the generic shapes.

use std::sync::LazyLock;

use regex::Regex;

use crate::degree::DegreeTable;

// ---------------------------------------------------------------------------
// Institution
// ---------------------------------------------------------------------------

/// Dash-like separators between two jointly named institutions. A bare
/// hyphen only counts when spaced, so "Hewlett-Packard" stays whole.
static JOINT_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+|\s*[–—]\s*").expect("valid separator regex"));

static INSTITUTION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let curated = [
        // Irregular names the generic shapes miss or truncate.
        r"(Texas\s+A\s*&?\s*M\s+University)",
        r"(Massachusetts\s+Institute\s+of\s+Technology)",
        r"(Indian\s+Institute\s+of\s+Technology)",
        r"(Georgia\s+Institute\s+of\s+Technology)",
        r"(Catholic\s+University\s+(?:of\s+)?[A-Za-z]+)",
        r"(Oklahoma\s+City\s+University)",
        r"(Southern\s+Methodist\s+University)",
        r"(Stanford\s+University)",
        r"(Yale\s+University)",
        r"(Harvard\s+University)",
        r"(Northwestern\s+University)",
        r"(Syracuse\s+University)",
        r"(Emory\s+University)",
        r"(Moscow\s+State\s+University(?:\s*\([^)]+\))?)",
        r"(Bo[gğ]azi[cç]i\s*University)",
        r"\b(MIT|INSEAD|KU\s+Leuven|London\s+Business\s+School)\b",
    ]
    .iter()
    .map(|p| format!("(?i){p}"));

    // Generic shapes are case-sensitive: a name is a run of capitalized words,
    // so "Ph.D. in Marketing from Duke University" yields "Duke University".
    let generic = [
        r"(University\s+of\s+[A-Z][A-Za-z\s\-]*?)(?:,|\s+\d{4}|;|\s*$)",
        r"((?:St\.\s+)?(?:[A-Z][A-Za-z'\-]*\s+)+University(?:\s*\([^)]+\))?)(?:,|\s+\d{4}|;|\s*$)",
        r"((?:[A-Z][A-Za-z'\-&]*\s+)+College)(?:,|\s+\d{4}|;|\s*$)",
    ]
    .iter()
    .map(|p| p.to_string());

    curated
        .chain(generic)
        .map(|p| Regex::new(&p).expect("valid institution regex"))
        .collect()
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Leading words that belong to the degree or the field, not the name
/// ("Economics Duke University", "MBA Duke University").
const FIELD_WORDS: &[&str] = &[
    "Accounting",
    "Administration",
    "Arts",
    "Biology",
    "Business",
    "Chemistry",
    "Economics",
    "Education",
    "Engineering",
    "Finance",
    "History",
    "Law",
    "Management",
    "Marketing",
    "Mathematics",
    "Medicine",
    "Philosophy",
    "Physics",
    "Psychology",
    "Science",
    "Sciences",
    "Sociology",
    "Statistics",
    "Strategy",
    "Studies",
];

/// Institution named on `line`, or `"A / B"` for a joint program.
pub fn institution(line: &str) -> Option<String> {
    let parts: Vec<&str> = JOINT_SEPARATOR_RE.split(line).collect();
    let joint = parts.windows(2).find_map(|pair| {
        let first = single_institution(pair[0])?;
        let second = single_institution(pair[1])?;
        Some(format!("{first} / {second}"))
    });

    joint.or_else(|| single_institution(line))
}

/// First institution-table match on `text`.
fn single_institution(text: &str) -> Option<String> {
    INSTITUTION_RES.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let name = WHITESPACE_RE.replace_all(caps[1].trim(), " ");
        let name = strip_leading_non_name(name.trim_end_matches(['.', ',', ';', ':']));
        (name.chars().count() >= 3).then(|| name.to_string())
    })
}

/// Drop leading degree tokens and field words while at least two words remain.
fn strip_leading_non_name(name: &str) -> &str {
    let degrees = DegreeTable::standard();
    let mut rest = name;
    while let Some((word, tail)) = rest.split_once(' ') {
        let consumed = FIELD_WORDS.contains(&word) || degrees.has_degree(word);
        if !consumed || !tail.contains(' ') {
            break;
        }
        rest = tail;
    }
    rest
}

// ---------------------------------------------------------------------------
// School
// ---------------------------------------------------------------------------

static SCHOOL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(Wharton\s+School)",
        r"(Kellogg\s+School\s+of\s+Management)",
        r"(Booth\s+School\s+of\s+Business)",
        r"(Graduate\s+School\s+of\s+Business)",
        r"(Goizueta\s+Business\s+School)",
        r"(Fuqua\s+School\s+of\s+Business)",
        r"(Ross\s+School\s+of\s+Business)",
        r"(Stern\s+School\s+of\s+Business)",
        r"(Sloan\s+School)",
        r"(Haas\s+School)",
        r"(Johnson\s+(?:Graduate\s+)?School)",
        r"(Darden\s+School)",
        r"(Scheller\s+College)",
        r"(Newhouse\s+School[^,]*)",
        r"([A-Z][a-z]+\s+School\s+of\s+(?:Business|Management|Law|Medicine|Engineering))",
        r"([A-Z][a-z]+\s+Business\s+School)",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid school regex"))
    .collect()
});

/// Named sub-school on `line`.
pub fn school(line: &str) -> Option<String> {
    SCHOOL_RES
        .iter()
        .find_map(|re| re.captures(line).map(|caps| caps[1].trim().to_string()))
}

// ---------------------------------------------------------------------------
// Year
// ---------------------------------------------------------------------------

const YEAR: &str = r"(19[5-9]\d|20[0-3]\d)";

static YEAR_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b{YEAR}\s*[-–—]\s*(?:\w+\s+)?{YEAR}\b")).expect("valid year regex")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{YEAR}\b")).expect("valid year regex"));

static RECOGNITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)alumnus|award|honor").expect("valid year regex"));

/// Completion year on `line`; the later endpoint of a range.
pub fn year(line: &str) -> Option<u16> {
    if let Some(caps) = YEAR_RANGE_RE.captures(line) {
        let start: Option<u16> = caps[1].parse().ok();
        let end: Option<u16> = caps[2].parse().ok();
        return start.max(end);
    }

    let years: Vec<&str> = YEAR_RE.find_iter(line).map(|m| m.as_str()).collect();
    let chosen = match years.as_slice() {
        [] => return None,
        // "Ph.D., 1998. Distinguished alumnus award, 2017": the degree year comes first.
        [first, _, ..] if RECOGNITION_RE.is_match(line) => first,
        [.., last] => last,
    };
    chosen.parse().ok()
}

// ---------------------------------------------------------------------------
// Pending context
// ---------------------------------------------------------------------------

/// Institution/school/year seen on a line without a degree token, waiting for
/// the next degree line that lacks its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingContext {
    pub institution: Option<String>,
    pub school: Option<String>,
    pub year: Option<u16>,
}

impl PendingContext {
    /// Context carried by a degree-free line, if it carries any.
    pub fn from_line(line: &str) -> Option<Self> {
        let pending = Self {
            institution: institution(line),
            school: school(line),
            year: year(line),
        };
        (!pending.is_empty()).then_some(pending)
    }

    pub fn is_empty(&self) -> bool {
        self.institution.is_none() && self.school.is_none() && self.year.is_none()
    }
}
