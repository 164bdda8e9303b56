//! Raw page text cleanup.
//!
//! Extracted page text carries hard line wraps that rarely mark paragraph
//! boundaries. This module joins hyphenated words split across lines,
//! collapses paragraph-internal wraps to spaces, and strips pseudo-markup
//! from page labels. All transforms are pure; there are no failure modes.

use std::sync::LazyLock;

use regex::Regex;

/// Line-final abbreviations after which a line break is paragraph-internal
/// even though the line ends with a period.
const ABBREVIATIONS: [&str; 4] = ["e.g.", "i.e.", "et al.", "p."];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// Clean one page of raw extracted text.
///
/// In order:
/// 1. a hyphen immediately followed by a line break is removed together
///    with the break, re-joining the split word;
/// 2. a line break not preceded by a sentence-terminating period becomes a
///    single space (it wrapped a line inside a paragraph);
/// 3. a line break following one of the abbreviations `e.g.`, `i.e.`,
///    `et al.`, `p.` is also treated as internal, overriding rule 2's
///    period check.
///
/// Line breaks that survive plausibly mark paragraph boundaries.
pub fn normalize_page_text(raw: &str) -> String {
    let dehyphenated = raw.replace("-\n", "");

    let mut out = String::with_capacity(dehyphenated.len());
    for ch in dehyphenated.chars() {
        if ch == '\n' {
            if out.ends_with('.') && !ends_with_abbreviation(&out) {
                out.push('\n');
            } else {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strip `<...>` pseudo-markup tags from a page label.
pub fn normalize_page_label(label: &str) -> String {
    TAG_RE.replace_all(label, "").into_owned()
}

fn ends_with_abbreviation(text: &str) -> bool {
    ABBREVIATIONS.iter().any(|abbr| text.ends_with(abbr))
}
