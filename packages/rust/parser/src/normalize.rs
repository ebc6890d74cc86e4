//! Per-line repair of PDF extraction artifacts.
//!
//! Upstream normalization already collapses whitespace and dashes. What is
//! left are glyph-level leftovers: detached diacritics and words that lost
//! their spaces ("KelloggSchoolofManagement").

use std::sync::LazyLock;

use regex::Regex;

/// Lowercase words that are capitalized before a split and restored after.
const CONNECTORS: &[&str] = &["with", "under", "from", "into", "over", "about", "of", "and", "for"];

/// Tokens shorter than this are left alone ("DePaul", "McKinsey").
const MIN_SPLIT_LEN: usize = 12;

static CONNECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([a-z])({})([A-Z])", CONNECTORS.join("|"))).expect("valid connector regex")
});

static CAMEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid camel regex"));

static GLUED_INSTITUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z])(University|Institute|College|School)").expect("valid glue regex")
});

static CAPITALIZED_CONNECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let capitalized: Vec<String> = CONNECTORS.iter().map(|w| capitalize(w)).collect();
    Regex::new(&format!(r"\b({})\b", capitalized.join("|"))).expect("valid connector regex")
});

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Repair a single line for pattern extraction.
pub fn repair_line(line: &str) -> String {
    let line = line
        .replace("g\u{02D8}", "ğ")
        .replace("c\u{00B8}", "ç")
        .replace(['\u{02D8}', '\u{00B8}'], "");

    let line = line.split(' ').map(split_run_together).collect::<Vec<_>>().join(" ");

    GLUED_INSTITUTION_RE.replace_all(&line, "$1 $2").into_owned()
}

/// Split one run-together token at lower→upper transitions.
fn split_run_together(token: &str) -> String {
    if token.chars().count() < MIN_SPLIT_LEN {
        return token.to_string();
    }

    let marked = CONNECTOR_RE.replace_all(token, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], capitalize(&caps[2]), &caps[3])
    });

    if CAMEL_RE.find_iter(&marked).count() < 2 {
        return token.to_string();
    }

    let split = CAMEL_RE.replace_all(&marked, "$1 $2");
    CAPITALIZED_CONNECTOR_RE
        .replace_all(&split, |caps: &regex::Captures| caps[1].to_lowercase())
        .into_owned()
}
