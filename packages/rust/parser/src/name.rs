//! Person name from the top of a CV.

use std::sync::LazyLock;

use regex::Regex;

/// How many leading lines are considered.
const NAME_SEARCH_LINES: usize = 10;

static SKIP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"@",
        r"\d{3}[-.\s]?\d{3}",
        r"http|www\.",
        r"^curriculum\s+vitae",
        r"^cv\s*$",
        r"^resume",
        r"^address",
        r"^phone",
        r"^updated",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid name regex"))
    .collect()
});

static CREDENTIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:,\s*|\s+)(?:Ph\.?D\.?|MBA|MD|JD)\b.*$").expect("valid name regex")
});

/// The first plausible name line, with any trailing credential removed.
pub fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .take(NAME_SEARCH_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !SKIP_RES.iter().any(|re| re.is_match(line)))
        .find(|line| looks_like_name(line))
        .map(|line| CREDENTIAL_RE.replace(line, "").trim().to_string())
        .filter(|name| !name.is_empty())
}

fn looks_like_name(line: &str) -> bool {
    let words = line.split_whitespace().count();
    if !(2..=5).contains(&words) {
        return false;
    }
    let total = line.chars().count().max(1);
    let name_like = line
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '-' | ','))
        .count();
    name_like as f64 / total as f64 > 0.85
}
