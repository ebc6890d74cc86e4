//! Dissertation title extraction for PhD-level degrees.
//!
//! Only two shapes count: a labeled title ("Dissertation: ...", "Thesis
//! title: ...", "Topic: ...") or a line that is nothing but a quoted title,
//! right after the PhD line. Narrative text never produces a title.

use std::sync::LazyLock;

use regex::Regex;

use edutrace_shared::ParserConfig;

static LABELED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:Dissertation|Thesis|Topic)(?:\s+title)?\s*:\s*(.+?)\s*$"#)
        .expect("valid dissertation regex")
});

static QUOTED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^["“](.+)["”]$"#).expect("valid dissertation regex")
});

const QUOTES: [char; 3] = ['"', '“', '”'];

/// Dissertation title for the PhD on `degree_line`, looking at the lines that follow it.
///
/// `following` must already be bounded to the PhD's neighborhood.
pub fn find_dissertation<S: AsRef<str>>(
    degree_line: &str,
    following: &[S],
    config: &ParserConfig,
) -> Option<String> {
    let window = following.iter().take(config.dissertation_lookahead);

    for (offset, line) in std::iter::once(degree_line)
        .chain(window.map(AsRef::<str>::as_ref))
        .enumerate()
    {
        let line = line.trim();

        if let Some(caps) = LABELED_RE.captures(line) {
            let title = caps[1].trim().trim_matches(QUOTES).trim();
            if title.chars().count() > config.min_dissertation_len {
                return Some(title.to_string());
            }
        }

        if (1..=config.quoted_title_window).contains(&offset) {
            if let Some(caps) = QUOTED_LINE_RE.captures(line) {
                let title = caps[1].trim();
                if title.chars().count() > config.min_quoted_title_len {
                    return Some(title.to_string());
                }
            }
        }
    }

    None
}
