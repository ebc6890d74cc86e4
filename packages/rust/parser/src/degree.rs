//! Degree token detection.
//!
//! Degree tokens are kept as an ordered table of tagged rules. Evaluation order
//! is PhD-class, then Masters-class, then Undergrad-class, and within a class
//! the order rules are listed in. That order is what makes the output
//! reproducible, so the table is a `Vec`, never a map.

use std::sync::LazyLock;

use regex::Regex;

use edutrace_shared::DegreeLevel;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Extra conditions a raw regex match must satisfy.
///
/// The `regex` crate has no lookaround, so context checks on either side of a
/// match live here.
#[derive(Debug, Clone, Copy)]
enum Guard {
    /// Reject when the token is followed by optional spaces and a digit (`MA 02139`).
    NoTrailingNumber,
    /// Accept only when followed by optional spaces and a comma or digit.
    TrailingCommaOrNumber,
    /// Reject when the character right before the token is one of these.
    NotPrecededBy(&'static [char]),
    /// Reject when the character right after the token is this letter (any case).
    NotFollowedBy(char),
}

impl Guard {
    fn allows(self, line: &str, start: usize, end: usize) -> bool {
        let before = line[..start].chars().next_back();
        let after = &line[end..];
        let next_non_space = after.trim_start().chars().next();
        match self {
            Guard::NoTrailingNumber => !next_non_space.is_some_and(|c| c.is_ascii_digit()),
            Guard::TrailingCommaOrNumber => {
                next_non_space.is_some_and(|c| c == ',' || c.is_ascii_digit())
            }
            Guard::NotPrecededBy(chars) => !before.is_some_and(|c| chars.contains(&c)),
            Guard::NotFollowedBy(letter) => !after
                .chars()
                .next()
                .is_some_and(|c| c.eq_ignore_ascii_case(&letter)),
        }
    }
}

/// One entry in the degree table.
#[derive(Debug)]
pub struct DegreeRule {
    /// Canonical label recorded on the degree (e.g. `Ph.D.`).
    pub label: &'static str,
    /// Level the label belongs to.
    pub level: DegreeLevel,
    pattern: Regex,
    guards: &'static [Guard],
}

impl DegreeRule {
    /// Case-insensitive rule, for dotted and spelled-out forms.
    fn new(pattern: &str, label: &'static str, level: DegreeLevel, guards: &'static [Guard]) -> Self {
        Self::compile(&format!("(?i){pattern}"), label, level, guards)
    }

    /// Case-sensitive rule, for bare uppercase abbreviations ("MA" but not "Ma").
    fn exact(pattern: &str, label: &'static str, level: DegreeLevel, guards: &'static [Guard]) -> Self {
        Self::compile(pattern, label, level, guards)
    }

    fn compile(pattern: &str, label: &'static str, level: DegreeLevel, guards: &'static [Guard]) -> Self {
        Self {
            label,
            level,
            pattern: Regex::new(pattern).expect("valid degree regex"),
            guards,
        }
    }

    /// First guarded match of this rule in `line`, as a byte span.
    fn find(&self, line: &str) -> Option<(usize, usize)> {
        self.pattern
            .find_iter(line)
            .map(|m| (m.start(), m.end()))
            .find(|&(start, end)| self.guards.iter().all(|g| g.allows(line, start, end)))
    }
}

/// A degree token found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeHit {
    pub level: DegreeLevel,
    pub label: &'static str,
    /// Byte offset of the token start.
    pub start: usize,
    /// Byte offset one past the token end.
    pub end: usize,
}

/// Ordered degree rule table.
#[derive(Debug)]
pub struct DegreeTable {
    rules: Vec<DegreeRule>,
}

// ---------------------------------------------------------------------------
// Standard table
// ---------------------------------------------------------------------------

const BACHELOR_DOTTED: &[Guard] = &[Guard::NotPrecededBy(&['M', 'm', '.'])];
const BACHELOR_SCIENCE_DOTTED: &[Guard] =
    &[Guard::NotPrecededBy(&['M', 'm', '.']), Guard::NotFollowedBy('B')];
const SHORT_FORM: &[Guard] = &[Guard::NoTrailingNumber];

static STANDARD: LazyLock<DegreeTable> = LazyLock::new(|| {
    use DegreeLevel::{Masters, Phd, Undergrad};

    let rules = vec![
        // Doctoral
        DegreeRule::new(r"\bPh\.?\s*D\.", "Ph.D.", Phd, &[]),
        DegreeRule::new(r"\bPhD\b", "Ph.D.", Phd, &[]),
        DegreeRule::new(r"\bDoctor\s+of\s+Philosophy", "Ph.D.", Phd, &[]),
        DegreeRule::new(r"\bD\.B\.A\.", "D.B.A.", Phd, &[]),
        DegreeRule::exact(r"\bDBA\b", "D.B.A.", Phd, &[]),
        DegreeRule::new(r"\bDoctor\s+of\s+Business\s+Administration", "D.B.A.", Phd, &[]),
        // Master's
        DegreeRule::new(r"\bM\.B\.A\.", "MBA", Masters, &[]),
        DegreeRule::exact(r"\bMBA\b", "MBA", Masters, &[]),
        DegreeRule::new(r"\bMaster\s+of\s+Business\s+Administration", "MBA", Masters, &[]),
        DegreeRule::new(r"\bM\.S\.", "M.S.", Masters, &[]),
        DegreeRule::exact(r"\bMS\b", "M.S.", Masters, SHORT_FORM),
        DegreeRule::new(r"\bMaster\s+of\s+Science", "M.S.", Masters, &[]),
        DegreeRule::new(r"\bM\.A\.", "M.A.", Masters, &[]),
        DegreeRule::exact(r"\bMA\b", "M.A.", Masters, SHORT_FORM),
        DegreeRule::new(r"\bMaster\s+of\s+Arts", "M.A.", Masters, &[]),
        DegreeRule::new(r"\bM\.Sc\.", "M.Sc.", Masters, &[]),
        DegreeRule::new(r"\bMSc\b", "M.Sc.", Masters, &[]),
        DegreeRule::new(r"\bM\.Phil\.", "M.Phil.", Masters, &[]),
        DegreeRule::new(r"\bMPhil\b", "M.Phil.", Masters, &[]),
        DegreeRule::new(r"\bLicentiaat\b", "Licentiaat", Masters, &[]),
        // Bachelor's
        DegreeRule::new(r"\bB\.A\.", "B.A.", Undergrad, BACHELOR_DOTTED),
        DegreeRule::exact(r"\bBA\b", "B.A.", Undergrad, SHORT_FORM),
        DegreeRule::new(r"\bBachelor\s+of\s+Arts", "B.A.", Undergrad, &[]),
        DegreeRule::new(r"\bB\.S\.", "B.S.", Undergrad, BACHELOR_SCIENCE_DOTTED),
        DegreeRule::exact(r"\bBS\b", "B.S.", Undergrad, SHORT_FORM),
        DegreeRule::new(r"\bBachelor\s+of\s+Science", "B.S.", Undergrad, &[]),
        DegreeRule::new(r"\bB\.S\.B\.", "B.S.B.", Undergrad, &[]),
        DegreeRule::exact(r"\bBSB\b", "B.S.B.", Undergrad, &[]),
        DegreeRule::new(r"\bB\.Sc\.", "B.Sc.", Undergrad, &[]),
        DegreeRule::new(r"\bBSc\b", "B.Sc.", Undergrad, &[]),
        DegreeRule::new(r"\bB\.Tech\.", "B.Tech.", Undergrad, &[]),
        DegreeRule::new(r"\bBTech\b", "B.Tech.", Undergrad, &[]),
        DegreeRule::new(r"\bBachelor\s+of\s+Technology", "B.Tech.", Undergrad, &[]),
        DegreeRule::new(r"\bB\.Eng\.", "B.Eng.", Undergrad, &[]),
        DegreeRule::new(r"\bBEng\b", "B.Eng.", Undergrad, &[]),
        DegreeRule::new(r"\bA\.B\.", "A.B.", Undergrad, &[]),
        DegreeRule::exact(r"\bAB\b", "A.B.", Undergrad, &[Guard::TrailingCommaOrNumber]),
        DegreeRule::new(r"\bKandidaat\b", "Kandidaat", Undergrad, &[]),
    ];

    DegreeTable { rules }
});

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

impl DegreeTable {
    /// The built-in degree table.
    pub fn standard() -> &'static DegreeTable {
        &STANDARD
    }

    /// Distinct labels in table order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::new();
        for rule in &self.rules {
            if !labels.contains(&rule.label) {
                labels.push(rule.label);
            }
        }
        labels
    }

    /// Whether `line` carries any degree token.
    pub fn has_degree(&self, line: &str) -> bool {
        self.rules.iter().any(|rule| rule.find(line).is_some())
    }

    /// All degree tokens on `line`.
    ///
    /// Overlapping candidates are resolved in favour of the longer match, then
    /// the earlier rule. Each label is reported at most once, and hits are
    /// returned in table order.
    pub fn detect(&self, line: &str) -> Vec<DegreeHit> {
        let mut candidates: Vec<(usize, usize, usize)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| rule.find(line).map(|(start, end)| (idx, start, end)))
            .collect();

        candidates.sort_by(|a, b| (b.2 - b.1).cmp(&(a.2 - a.1)).then(a.0.cmp(&b.0)));

        let mut kept: Vec<(usize, usize, usize)> = Vec::new();
        for cand in candidates {
            let overlaps = kept.iter().any(|k| cand.1 < k.2 && k.1 < cand.2);
            if !overlaps {
                kept.push(cand);
            }
        }
        kept.sort_by_key(|&(idx, start, _)| (idx, start));

        let mut hits: Vec<DegreeHit> = Vec::new();
        for (idx, start, end) in kept {
            let rule = &self.rules[idx];
            if hits.iter().any(|h| h.label == rule.label) {
                continue;
            }
            hits.push(DegreeHit {
                level: rule.level,
                label: rule.label,
                start,
                end,
            });
        }
        hits
    }
}
