use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use gemma_chat_core::{format_message, Message, Sender};
use crate::app::{App, ServerStatus};
use crate::markup::html_to_lines;

const USER_BG: Color = Color::Rgb(0, 123, 255);
const USER_FG: Color = Color::Rgb(255, 255, 255);
const BOT_BG: Color = Color::Rgb(68, 68, 68);
const BOT_FG: Color = Color::Rgb(221, 221, 221);
const CODE_BG: Color = Color::Rgb(40, 40, 40);
const CODE_FG: Color = Color::Rgb(152, 195, 121);

const INPUT_PLACEHOLDER: &str = "Type a message...";

fn bubble_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(USER_FG).bg(USER_BG),
        Sender::Bot => Style::default().fg(BOT_FG).bg(BOT_BG),
    }
}

fn bubble_alignment(sender: Sender) -> Alignment {
    match sender {
        Sender::User => Alignment::Right,
        Sender::Bot => Alignment::Left,
    }
}

fn label_line(sender: Sender) -> Line<'static> {
    let (label, color) = match sender {
        Sender::User => ("You", USER_BG),
        Sender::Bot => ("Bot", BOT_FG),
    };
    Line::from(Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)))
        .alignment(bubble_alignment(sender))
}

/// Pad a content line with a cell of bubble colour on each side.
fn pad(line: Line<'static>, style: Style, alignment: Alignment) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 2);
    spans.push(Span::styled(" ", style));
    spans.extend(line.spans);
    spans.push(Span::styled(" ", style));
    Line::from(spans).alignment(alignment)
}

/// Lines for one message: sender label, body, trailing blank
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let sender = message.sender();
    let alignment = bubble_alignment(sender);

    // Code replies are shown verbatim rather than formatted
    let (style, body) = if message.is_code() {
        let style = Style::default().fg(CODE_FG).bg(CODE_BG);
        let body: Vec<Line<'static>> = message
            .text()
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), style)))
            .collect();
        (style, body)
    } else {
        let style = bubble_style(sender);
        (style, html_to_lines(&format_message(message.text()), style))
    };

    let mut lines = vec![label_line(sender)];
    lines.extend(body.into_iter().map(|l| pad(l, style, alignment)));
    lines.push(Line::default());
    lines
}

fn typing_lines(frame: u8) -> Vec<Line<'static>> {
    let style = bubble_style(Sender::Bot).add_modifier(Modifier::ITALIC);
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat(usize::from(frame) + 1);
    vec![
        label_line(Sender::Bot),
        pad(Line::from(Span::styled(format!("Bot is typing{dots}"), style)), style, Alignment::Left),
    ]
}

/// Split `s` into alternating runs of whitespace and non-whitespace.
fn split_words(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            pieces.push(&s[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < s.len() {
        pieces.push(&s[start..]);
    }
    pieces
}

fn end_row(rows: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>, alignment: Option<Alignment>) {
    let mut row = Line::from(std::mem::take(current));
    row.alignment = alignment;
    rows.push(row);
}

/// End a row at a wrap point, dropping the whitespace it ends on.
fn break_row(rows: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>, alignment: Option<Alignment>) {
    while current.last().is_some_and(|span| span.content.trim().is_empty()) {
        current.pop();
    }
    end_row(rows, current, alignment);
}

/// Word-wrap a styled line into rows of at most `width` characters.
///
/// Rows are produced here rather than by `Paragraph` so the scroll range
/// matches exactly what is drawn. Breaks swallow the whitespace around
/// them; words wider than a row are split.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let alignment = line.alignment;
    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0;

    for span in line.spans {
        let style = span.style;
        for piece in split_words(&span.content) {
            let piece_width = piece.chars().count();
            if row_width + piece_width <= width {
                current.push(Span::styled(piece.to_string(), style));
                row_width += piece_width;
                continue;
            }

            if row_width > 0 {
                break_row(&mut rows, &mut current, alignment);
                row_width = 0;
            }
            if piece.starts_with(char::is_whitespace) {
                continue;
            }

            let chars: Vec<char> = piece.chars().collect();
            for chunk in chars.chunks(width) {
                if row_width > 0 {
                    end_row(&mut rows, &mut current, alignment);
                }
                current.push(Span::styled(chunk.iter().collect::<String>(), style));
                row_width = chunk.len();
            }
        }
    }

    end_row(&mut rows, &mut current, alignment);
    rows
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let [chat_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");
    let inner = block.inner(area);

    app.chat_area = Some(area);
    app.chat_height = inner.height;

    let conversation = app.session.conversation();
    if conversation.is_empty() && !app.session.is_typing() {
        let placeholder = Paragraph::new("Say something to start the conversation.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        app.max_scroll = 0;
        app.scroll = 0;
        return;
    }

    let mut lines: Vec<Line<'static>> = conversation.iter().flat_map(message_lines).collect();
    if app.session.is_typing() {
        lines.extend(typing_lines(app.animation_frame));
    }

    let lines: Vec<Line<'static>> = lines
        .into_iter()
        .flat_map(|line| wrap_line(line, usize::from(inner.width)))
        .collect();
    let total = lines.len();
    app.max_scroll = u16::try_from(total.saturating_sub(usize::from(inner.height))).unwrap_or(u16::MAX);
    app.scroll = if app.follow_bottom {
        app.max_scroll
    } else {
        app.scroll.min(app.max_scroll)
    };

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if app.is_waiting() {
        (Color::DarkGray, " Message (waiting for reply) ")
    } else {
        (USER_BG, " Message ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        let visible_text: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::White))
    };
    frame.render_widget(input.block(block), area);

    let cursor_x = u16::try_from(app.cursor - scroll_offset).unwrap_or(0);
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let (marker, color) = match app.server_status {
        ServerStatus::Checking => ("checking", Color::Yellow),
        ServerStatus::Reachable => ("connected", Color::Green),
        ServerStatus::Unreachable => ("unreachable", Color::Red),
    };

    let status = Line::from(vec![
        Span::styled(format!(" ● {marker} "), Style::default().fg(color)),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::styled(
            "  Enter send · PgUp/PgDn scroll · Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemma_chat_core::ChatClient;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
    }

    fn test_app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:5000/chat"))
    }

    #[test]
    fn test_message_lines_format_bot_text() {
        let lines = message_lines(&Message::bot("## Hi\nsome **bold**"));
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, ["Bot", " Hi ", " some bold ", ""]);
        assert_eq!(lines[1].alignment, Some(Alignment::Left));
    }

    #[test]
    fn test_user_lines_are_right_aligned() {
        let lines = message_lines(&Message::user("hello"));
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(lines[1].alignment, Some(Alignment::Right));
        assert_eq!(lines[1].spans[1].style.bg, Some(USER_BG));
    }

    #[test]
    fn test_code_reply_is_verbatim() {
        let lines = message_lines(&Message::bot("```rust\n**x**\n```"));
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, ["Bot", " ```rust ", " **x** ", " ``` ", ""]);
        assert_eq!(lines[2].spans[1].style.bg, Some(CODE_BG));
    }

    fn row_text(rows: &[Line<'_>]) -> Vec<String> {
        rows.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_wrap_line_breaks_on_words() {
        let rows = wrap_line(Line::from("aaaaaa bbbbbb cc"), 10);
        assert_eq!(row_text(&rows), ["aaaaaa", "bbbbbb cc"]);
    }

    #[test]
    fn test_wrap_line_splits_long_words() {
        let rows = wrap_line(Line::from("a".repeat(25)), 10);
        assert_eq!(row_text(&rows), ["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn test_wrap_line_keeps_empty_lines_and_alignment() {
        assert_eq!(wrap_line(Line::default(), 10).len(), 1);

        let rows = wrap_line(Line::from("one two three").alignment(Alignment::Right), 5);
        assert_eq!(row_text(&rows), ["one", "two", "three"]);
        assert!(rows.iter().all(|r| r.alignment == Some(Alignment::Right)));
    }

    #[test]
    fn test_wrap_line_keeps_span_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![Span::raw("plain "), Span::styled("strong words", bold)]);
        let rows = wrap_line(line, 8);

        assert_eq!(row_text(&rows), ["plain", "strong", "words"]);
        assert_eq!(rows[2].spans[0].style, bold);
    }

    #[test]
    fn test_follow_bottom_shows_end_of_wrapped_reply() {
        let mut app = test_app();
        for i in 0..7 {
            app.session.begin_turn(&format!("q{i}"));
            app.session
                .complete_turn(Ok("aaaaaa bbbbbb cccccc dddddd eeeeee ffffff LASTWORD".to_string()));
        }

        let mut terminal = Terminal::new(TestBackend::new(14, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert_eq!(app.scroll, app.max_scroll);
        assert!(screen_text(&terminal).contains("LASTWORD"));
    }

    #[test]
    fn test_empty_chat_shows_placeholders() {
        let mut app = test_app();
        let terminal = draw(&mut app);
        let screen = screen_text(&terminal);
        assert!(screen.contains("Say something to start the conversation."));
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert!(screen.contains("checking"));
    }

    #[test]
    fn test_typing_indicator_is_drawn() {
        let mut app = test_app();
        app.session.begin_turn("question");
        app.animation_frame = 2;

        let screen = screen_text(&draw(&mut app));
        assert!(screen.contains("question"));
        assert!(screen.contains("Bot is typing..."));

        app.session.complete_turn(Ok("answer".to_string()));
        let screen = screen_text(&draw(&mut app));
        assert!(screen.contains("answer"));
        assert!(!screen.contains("Bot is typing"));
    }

    #[test]
    fn test_follow_bottom_scrolls_to_end() {
        let mut app = test_app();
        for i in 0..20 {
            app.session.begin_turn(&format!("q{i}"));
            app.session.complete_turn(Ok(format!("reply number {i}")));
        }

        let screen = screen_text(&draw(&mut app));
        assert!(app.max_scroll > 0);
        assert_eq!(app.scroll, app.max_scroll);
        assert!(screen.contains("reply number 19"));
    }
}
