//! Markdown-ish text to a restricted HTML subset
//!
//! Only three constructs are recognised, applied in this order:
//!
//! 1. `#`..`######` at the start of a line become `<h1>`..`<h6>`
//! 2. `**text**` becomes `<strong>text</strong>`
//! 3. every newline becomes an empty `<p></p>` marker
//!
//! Headings run first so that the newline pass can't break the line anchors.
//! Both patterns run in CRLF mode: `\r` ends a line and is never part of a
//! heading title or a bold run.
//! The text is not HTML-escaped.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Marker emitted in place of each newline
pub const PARAGRAPH_BREAK: &str = "<p></p>";

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mR)^(#{1,6})\s*(.+)$").expect("heading pattern is valid and should always compile")
    })
}

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?R)\*\*(.*?)\*\*").expect("bold pattern is valid and should always compile")
    })
}

/// Convert raw message text into the restricted HTML subset.
pub fn format_message(content: &str) -> String {
    let with_headings = heading_regex().replace_all(content, |caps: &Captures<'_>| {
        let level = caps[1].len();
        format!("<h{level}>{}</h{level}>", &caps[2])
    });

    let with_bold = bold_regex().replace_all(&with_headings, "<strong>${1}</strong>");

    with_bold.replace('\n', PARAGRAPH_BREAK)
}
