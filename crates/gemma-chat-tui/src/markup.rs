//! Turn the formatter's HTML subset into styled terminal lines
//!
//! Understands exactly what `format_message` emits: `<h1>`..`<h6>`,
//! `<strong>` and the `<p></p>` break marker. Any other `<` is shown as-is.

use gemma_chat_core::format::PARAGRAPH_BREAK;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Break,
    HeadingOpen(u8),
    HeadingClose,
    StrongOpen,
    StrongClose,
}

/// Recognise a tag at the start of `s`, returning it with its length.
fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    if s.starts_with(PARAGRAPH_BREAK) {
        return Some((Tag::Break, PARAGRAPH_BREAK.len()));
    }
    if s.starts_with("<strong>") {
        return Some((Tag::StrongOpen, "<strong>".len()));
    }
    if s.starts_with("</strong>") {
        return Some((Tag::StrongClose, "</strong>".len()));
    }

    let bytes = s.as_bytes();
    match bytes {
        [b'<', b'h', level @ b'1'..=b'6', b'>', ..] => Some((Tag::HeadingOpen(level - b'0'), 4)),
        [b'<', b'/', b'h', b'1'..=b'6', b'>', ..] => Some((Tag::HeadingClose, 5)),
        _ => None,
    }
}

struct LineBuilder {
    base: Style,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    text: String,
    heading: Option<u8>,
    strong: usize,
}

impl LineBuilder {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            spans: Vec::new(),
            text: String::new(),
            heading: None,
            strong: 0,
        }
    }

    fn current_style(&self) -> Style {
        let mut style = self.base;
        if let Some(level) = self.heading {
            style = style.add_modifier(Modifier::BOLD);
            if level <= 2 {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
        }
        if self.strong > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    /// Close the pending text run before the style changes.
    fn flush_span(&mut self) {
        if !self.text.is_empty() {
            let style = self.current_style();
            self.spans.push(Span::styled(std::mem::take(&mut self.text), style));
        }
    }

    fn end_line(&mut self) {
        self.flush_span();
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn apply(&mut self, tag: Tag) {
        self.flush_span();
        match tag {
            Tag::Break => self.end_line(),
            Tag::HeadingOpen(level) => self.heading = Some(level),
            Tag::HeadingClose => self.heading = None,
            Tag::StrongOpen => self.strong += 1,
            Tag::StrongClose => self.strong = self.strong.saturating_sub(1),
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.end_line();
        self.lines
    }
}

/// Convert formatted message HTML into lines, layering emphasis on `base`.
pub fn html_to_lines(html: &str, base: Style) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new(base);
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        builder.text.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match parse_tag(rest) {
            Some((tag, len)) => {
                builder.apply(tag);
                rest = &rest[len..];
            }
            None => {
                builder.text.push('<');
                rest = &rest[1..];
            }
        }
    }
    builder.text.push_str(rest);

    builder.finish()
}
